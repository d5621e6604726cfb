mod create_admin;
mod list_admins;

pub use create_admin::cmd_create_admin;
pub use list_admins::cmd_list_admins;
