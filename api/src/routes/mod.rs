pub mod ask;
pub mod health_route;
pub mod history;
pub mod kb_admin;
