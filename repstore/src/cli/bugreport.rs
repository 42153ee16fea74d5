use bugreport::{
    bugreport,
    collector::{CompileTimeInformation, EnvironmentVariables, OperatingSystem, SoftwareVersion},
    format::Markdown,
};

pub fn run() {
    bugreport!()
        .info(SoftwareVersion::default())
        .info(OperatingSystem::default())
        .info(EnvironmentVariables::list(&[
            "SHELL",
            "TERM",
            "REPSTORE_PORT",
            "REPSTORE_DATA_DIR",
            "REPSTORE_DATA_FILE",
            "REPSTORE_ALLOWED_ORIGIN",
        ]))
        .info(CompileTimeInformation::default())
        .print::<Markdown>();
}
