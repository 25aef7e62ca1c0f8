pub mod apply;
pub mod configure;
pub mod list;
pub mod restore;
