pub mod bugreport;
pub mod client;
pub mod server;
pub mod version;

pub const SERVER_SUBCOMMAND: &str = "server";
pub const SERVER_DESCRIPTION: &str = "Run the REST server";

pub const VERSION_SUBCOMMAND: &str = "version";
pub const VERSION_DESCRIPTION: &str = "Display the version and build information";

pub const BUGREPORT_SUBCOMMAND: &str = "bugreport";
pub const BUGREPORT_DESCRIPTION: &str = "Collect information for a bug report";

pub const LIST_SUBCOMMAND: &str = "list";
pub const LIST_DESCRIPTION: &str = "List all reports in the store";

pub const SHOW_SUBCOMMAND: &str = "show";
pub const SHOW_DESCRIPTION: &str = "Show a single report with its attachment";

pub const CREATE_SUBCOMMAND: &str = "create";
pub const CREATE_DESCRIPTION: &str = "Create a new report, optionally attaching a file";

pub const EDIT_SUBCOMMAND: &str = "edit";
pub const EDIT_DESCRIPTION: &str = "Edit a report's fields and its attachment";

pub const DELETE_SUBCOMMAND: &str = "delete";
pub const DELETE_DESCRIPTION: &str = "Delete a report and its attachment";
