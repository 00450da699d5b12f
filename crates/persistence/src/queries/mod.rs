// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function here takes a plain connection, so it can run either on
//! its own or inside a unit-of-work transaction.

pub mod offers;
pub mod requests;
pub mod users;

pub use offers::{get_offer_view, list_offers};
pub use requests::{get_request, list_open_requests, list_requests_for_farmer, load_aggregate};
pub use users::{get_user, get_user_by_username};
