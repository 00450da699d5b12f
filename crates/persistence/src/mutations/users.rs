// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Users directory mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::info;

use crate::diesel_schema::users;
use crate::encoding::encode_timestamp;
use crate::error::PersistenceError;

/// Adds a user to the directory.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The unique username
/// * `role` - The stored role name
/// * `now` - Creation time
///
/// # Errors
///
/// Returns `PersistenceError::ConstraintViolation` if the username is taken
/// or the role is not one the schema allows.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    role: &str,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let user_id: i64 = diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::role.eq(role),
            users::created_at.eq(encode_timestamp(now)?),
        ))
        .returning(users::user_id)
        .get_result(conn)?;

    info!(user_id, username, role, "Created user");
    Ok(user_id)
}
