// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

diesel::table! {
    offers (offer_id) {
        offer_id -> BigInt,
        request_id -> BigInt,
        provider_id -> BigInt,
        offered_price -> Text,
        estimated_cost -> Text,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    service_requests (request_id) {
        request_id -> BigInt,
        farmer_id -> BigInt,
        service_type -> Text,
        description -> Nullable<Text>,
        location_lat -> Nullable<Double>,
        location_lon -> Nullable<Double>,
        required_date -> Text,
        budget -> Nullable<Text>,
        status -> Text,
        accepted_offer_id -> Nullable<BigInt>,
        service_provider_id -> Nullable<BigInt>,
        completed_at -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    users (user_id) {
        user_id -> BigInt,
        username -> Text,
        role -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(offers -> service_requests (request_id));
diesel::joinable!(offers -> users (provider_id));

diesel::allow_tables_to_appear_in_same_query!(offers, service_requests, users,);
