mod delete;
mod export;
mod helpers;
mod history;
mod log;
mod summary;

pub(crate) use delete::cmd_delete;
pub(crate) use export::cmd_export;
pub(crate) use history::{cmd_history, cmd_trend};
pub(crate) use log::{LogArgs, cmd_log};
pub(crate) use summary::{cmd_stats, cmd_users};
