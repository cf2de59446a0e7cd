/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use std::time::Duration;

pub type DbPool = Pool<AsyncPgConnection>;

const MAX_POOL_SIZE: u32 = 50;
/// Connection timeout in seconds - pool will fail instead of retrying forever
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Build the shared async connection pool.
///
/// Tests the connection BEFORE creating the pool to fail fast without
/// background retry noise.
pub async fn establish_pool(database_url: &str) -> Result<DbPool, String> {
  establish_pool_with_size(database_url, MAX_POOL_SIZE).await
}

pub async fn establish_pool_with_size(
  database_url: &str,
  max_size: u32,
) -> Result<DbPool, String> {
  AsyncPgConnection::establish(database_url)
    .await
    .map_err(|e| format!("Failed to connect to database: {}", e))?;

  let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
  Pool::builder()
    .max_size(max_size)
    .connection_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
    .build(manager)
    .await
    .map_err(|e| format!("Failed to build connection pool: {}", e))
}
