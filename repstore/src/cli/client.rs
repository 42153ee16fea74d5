use std::io::{BufRead, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use client::store::{FetchStatus, ReportsStore, Severity};
use client::{Part, ReportFields, ReportsApi, file_part};
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_HORIZONTAL_ONLY};
use kernel::Report;

pub async fn list(uri: &str) {
    let Some(api) = open_api(uri) else { return };
    let mut store = ReportsStore::new();
    store.fetch_reports(&api).await;
    render_notification(&mut store);
    if store.status == FetchStatus::Succeeded {
        render_list(&store.reports);
    }
}

pub async fn show(uri: &str, id: &str) {
    let Some(api) = open_api(uri) else { return };
    let mut store = ReportsStore::new();
    store.fetch_report_detail(&api, id).await;
    render_notification(&mut store);
    if let Some(report) = &store.detail {
        render_detail(report);
    }
}

pub async fn create(uri: &str, fields: &ReportFields, file: Option<&Path>) {
    let Some(api) = open_api(uri) else { return };
    let part = match attachment(file).await {
        Ok(part) => part,
        Err(()) => return,
    };
    let mut store = ReportsStore::new();
    store.create_report(&api, fields, part).await;
    render_notification(&mut store);
    if let Some(created) = store.reports.last() {
        println!("id: {}", created.id);
    }
}

pub async fn edit(uri: &str, id: &str, fields: &ReportFields, file: Option<&Path>, remove_file: bool) {
    let Some(api) = open_api(uri) else { return };
    let part = match attachment(file).await {
        Ok(part) => part,
        Err(()) => return,
    };
    let mut store = ReportsStore::new();
    store.update_report(&api, id, fields, part, remove_file).await;
    render_notification(&mut store);
}

pub async fn delete(uri: &str, id: &str, yes: bool) {
    if !yes && !confirm(id) {
        println!("delete cancelled");
        return;
    }
    let Some(api) = open_api(uri) else { return };
    let mut store = ReportsStore::new();
    store.delete_report(&api, id).await;
    render_notification(&mut store);
}

fn open_api(uri: &str) -> Option<ReportsApi> {
    match ReportsApi::new(uri) {
        Ok(api) => Some(api),
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}

async fn attachment(file: Option<&Path>) -> Result<Option<Part>, ()> {
    let Some(path) = file else { return Ok(None) };
    match file_part(path).await {
        Ok(part) => Ok(Some(part)),
        Err(e) => {
            eprintln!("no such file {}: {e}", path.display());
            Err(())
        }
    }
}

/// Interactive gate in front of the destructive operation.
fn confirm(id: &str) -> bool {
    print!("Delete report {id}? [y/N]: ");
    std::io::stdout().flush().unwrap_or_default();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

fn render_notification(store: &mut ReportsStore) {
    if let Some(notification) = store.take_notification() {
        match notification.severity {
            Severity::Success => println!("{}", notification.message),
            Severity::Error => eprintln!("error: {}", notification.message),
        }
    }
}

fn render_list(reports: &[Report]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120)
        .set_header(vec![
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Sender").add_attribute(Attribute::Bold),
            Cell::new("Age").add_attribute(Attribute::Bold),
            Cell::new("Job").add_attribute(Attribute::Bold),
            Cell::new("File").add_attribute(Attribute::Bold),
        ]);

    for report in reports {
        table.add_row(vec![
            Cell::new(&report.id),
            Cell::new(&report.sender_name),
            Cell::new(report.age),
            Cell::new(&report.job),
            Cell::new(report.file_url.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn render_detail(report: &Report) {
    println!("Id         : {}", report.id);
    println!("Sender     : {}", report.sender_name);
    println!("Age        : {}", report.age);
    println!("Job        : {}", report.job);
    println!("File       : {}", report.file_url.as_deref().unwrap_or("-"));
    if let Some(payload) = &report.file {
        match BASE64.decode(payload) {
            Ok(bytes) => println!("Attachment : {} bytes inline", bytes.len()),
            Err(_) => println!("Attachment : undecodable payload"),
        }
    }
}
