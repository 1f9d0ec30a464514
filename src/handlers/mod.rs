// handlers/mod.rs - Handler tiers
//
// status: no authentication (/, /health)
// users:  guarded by the admin or self-or-admin authorizer (/users/*)
pub mod status;
pub mod users;
