//! Text front end for the contact book and finance tracker.
//!
//! # Responsibility
//! - Open both stores from the current directory and print their views.
//! - Exercise the same service entry points a form front end would call.

use log::error;
use recordbook_core::model::transaction::format_date;
use recordbook_core::{init_logging, AppConfig, ContactBook, Dashboard, FinanceTracker};
use std::process::ExitCode;

fn main() -> ExitCode {
    let data_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("cannot resolve current directory: {err}");
            return ExitCode::FAILURE;
        }
    };
    let config = AppConfig::in_dir(data_dir);

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    println!("recordbook {}", recordbook_core::core_version());
    print_contacts(&ContactBook::open(config.contacts_path()));

    match FinanceTracker::open(config.finance_db_path(), config.initial_balance) {
        Ok(tracker) => {
            print_transactions(&tracker);
            match tracker.dashboard() {
                Ok(dashboard) => print_dashboard(&dashboard),
                Err(err) => eprintln!("dashboard unavailable: {err}"),
            }
        }
        Err(err) => {
            error!("event=cli_finance_open module=cli status=error error={err}");
            eprintln!("finance ledger unavailable: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn print_contacts(book: &ContactBook) {
    println!("\n== Contacts ({}) ==", book.len());
    if book.is_read_only() {
        println!("(contacts file could not be read; edits are disabled)");
    }
    for row in book.contacts() {
        println!(
            "{:>3}  {:<6} {:<20} {:<15} {:<28} {}",
            row.row_number,
            row.handle,
            row.contact.name,
            row.contact.phone,
            row.contact.email,
            row.contact.address.replace('\n', ", ")
        );
    }
}

fn print_transactions(tracker: &FinanceTracker) {
    let rows = tracker.transactions();
    println!("\n== Transactions ({}) ==", rows.len());
    if tracker.is_read_only() {
        println!("(ledger holds unreadable rows; edits are disabled)");
    }
    for entry in rows {
        let tx = entry.record;
        println!(
            "{:<6} {:<8} {:>12.2}  {}  {}",
            entry.handle,
            tx.kind,
            tx.amount,
            format_date(tx.date),
            tx.description
        );
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("\n== Dashboard ==");
    for slice in &dashboard.income_vs_expense {
        println!("{:<20} {:>12.2}", slice.label, slice.value);
    }
    if !dashboard.expense_by_category.is_empty() {
        println!("-- Expenses by category --");
        for (category, total) in dashboard.expense_by_category.iter() {
            println!("{category:<20} {total:>12.2}");
        }
    }
    println!("Total Balance: ${:.2}", dashboard.balance);
}
