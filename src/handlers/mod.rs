// HTTP handlers
//
// Public:    /, /health, /api/<content> reads, /api/visitors, /api/auth/*
// Protected: every write, /api/admin/*, /api/visitors/stats
//
// Protected handlers take `RequireSession` as their first extractor so a
// missing session is rejected before the body is read or a store is touched.
pub mod auth;
pub mod content;
pub mod crud;
pub mod system;
pub mod visitors;
