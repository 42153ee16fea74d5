use std::path::PathBuf;

use clap::{arg, command, crate_name, ArgMatches, Command};
use client::ReportFields;

mod cli;

#[tokio::main]
async fn main() {
    let cli = command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(Command::new(cli::VERSION_SUBCOMMAND).about(cli::VERSION_DESCRIPTION))
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(Command::new(cli::SERVER_SUBCOMMAND).about(cli::SERVER_DESCRIPTION))
        .subcommand(
            Command::new(cli::LIST_SUBCOMMAND)
                .about(cli::LIST_DESCRIPTION)
                .arg(uri_arg()),
        )
        .subcommand(
            Command::new(cli::SHOW_SUBCOMMAND)
                .about(cli::SHOW_DESCRIPTION)
                .arg(uri_arg())
                .arg(arg!(<ID>).help("Report id")),
        )
        .subcommand(
            Command::new(cli::CREATE_SUBCOMMAND)
                .about(cli::CREATE_DESCRIPTION)
                .arg(uri_arg())
                .args(field_args())
                .arg(
                    arg!(-f --file <FILE>)
                        .required(false)
                        .help("Path to file to attach"),
                ),
        )
        .subcommand(
            Command::new(cli::EDIT_SUBCOMMAND)
                .about(cli::EDIT_DESCRIPTION)
                .arg(uri_arg())
                .arg(arg!(<ID>).help("Report id"))
                .args(field_args())
                .arg(
                    arg!(-f --file <FILE>)
                        .required(false)
                        .help("Path to file replacing the stored one"),
                )
                .arg(arg!(--"remove-file").help("Detach and delete the stored file")),
        )
        .subcommand(
            Command::new(cli::DELETE_SUBCOMMAND)
                .about(cli::DELETE_DESCRIPTION)
                .arg(uri_arg())
                .arg(arg!(<ID>).help("Report id"))
                .arg(arg!(-y --yes).help("Skip the confirmation prompt")),
        )
        .arg_required_else_help(true)
        .disable_version_flag(true)
        .get_matches();

    if cli.subcommand_matches(cli::VERSION_SUBCOMMAND).is_some() {
        cli::version::run();
    } else if cli.subcommand_matches(cli::BUGREPORT_SUBCOMMAND).is_some() {
        cli::bugreport::run();
    } else if cli.subcommand_matches(cli::SERVER_SUBCOMMAND).is_some() {
        cli::server::run().await;
    } else if let Some(list_matches) = cli.subcommand_matches(cli::LIST_SUBCOMMAND) {
        let uri = uri_of(list_matches);
        cli::client::list(uri).await;
    } else if let Some(show_matches) = cli.subcommand_matches(cli::SHOW_SUBCOMMAND) {
        let uri = uri_of(show_matches);
        let id = id_of(show_matches);
        cli::client::show(uri, id).await;
    } else if let Some(create_matches) = cli.subcommand_matches(cli::CREATE_SUBCOMMAND) {
        let uri = uri_of(create_matches);
        let fields = fields_of(create_matches);
        let file = file_of(create_matches);
        cli::client::create(uri, &fields, file.as_deref()).await;
    } else if let Some(edit_matches) = cli.subcommand_matches(cli::EDIT_SUBCOMMAND) {
        let uri = uri_of(edit_matches);
        let id = id_of(edit_matches);
        let fields = fields_of(edit_matches);
        let file = file_of(edit_matches);
        let remove_file = edit_matches.get_flag("remove-file");
        cli::client::edit(uri, id, &fields, file.as_deref(), remove_file).await;
    } else if let Some(delete_matches) = cli.subcommand_matches(cli::DELETE_SUBCOMMAND) {
        let uri = uri_of(delete_matches);
        let id = id_of(delete_matches);
        let yes = delete_matches.get_flag("yes");
        cli::client::delete(uri, id, yes).await;
    }
}

fn uri_arg() -> clap::Arg {
    arg!(-u --uri <URI>).required(true).help("Repstore URI")
}

fn field_args() -> [clap::Arg; 3] {
    [
        arg!(-s --sender <NAME>).required(true).help("Sender name"),
        arg!(-a --age <AGE>)
            .required(true)
            .value_parser(clap::value_parser!(i64))
            .help("Sender age"),
        arg!(-j --job <JOB>).required(true).help("Sender job"),
    ]
}

fn uri_of(matches: &ArgMatches) -> &str {
    matches.get_one::<String>("uri").unwrap()
}

fn id_of(matches: &ArgMatches) -> &str {
    matches.get_one::<String>("ID").unwrap()
}

fn file_of(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<String>("file").map(PathBuf::from)
}

fn fields_of(matches: &ArgMatches) -> ReportFields {
    ReportFields {
        sender_name: matches.get_one::<String>("sender").unwrap().clone(),
        age: *matches.get_one::<i64>("age").unwrap(),
        job: matches.get_one::<String>("job").unwrap().clone(),
    }
}
