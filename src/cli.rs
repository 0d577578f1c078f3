// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn flow_cmd(name: &'static str, noun: &'static str) -> Command {
    Command::new(name)
        .about(format!("Manage {}", noun))
        .subcommand(
            Command::new("add")
                .about(format!("Add a {}", name))
                .arg(Arg::new("date").long("date").required(true).help("Settlement date, YYYY-MM-DD"))
                .arg(Arg::new("desc").long("desc").required(true))
                .arg(Arg::new("amount").long("amount").required(true).help("Major units, e.g. 1234.56"))
                .arg(Arg::new("currency").long("currency").help("Defaults to the base currency")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about(format!("List {}", noun))
                .arg(
                    Arg::new("unpaid")
                        .long("unpaid")
                        .action(ArgAction::SetTrue)
                        .help("Only unsettled entries"),
                ),
        ))
        .subcommand(
            Command::new("toggle")
                .about("Flip the paid/unpaid flag")
                .arg(Arg::new("id").long("id").required(true)),
        )
}

fn export_target(name: &'static str) -> Command {
    Command::new(name)
        .arg(
            Arg::new("format")
                .long("format")
                .default_value("csv")
                .help("csv or json"),
        )
        .arg(Arg::new("out").long("out").required(true).help("Output file"))
}

pub fn build_cli() -> Command {
    Command::new("cashclip")
        .version(crate_version!())
        .about("Multi-currency cash position and rolling cash-flow forecast")
        .subcommand(Command::new("init").about("Create the database if missing and print its path"))
        .subcommand(
            Command::new("balance")
                .about("Monthly cash-position snapshots")
                .subcommand(
                    Command::new("add")
                        .about("Enter (or replace) the snapshot for a month")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(
                            Arg::new("line")
                                .long("line")
                                .required(true)
                                .action(ArgAction::Append)
                                .help("Sub-balance as LABEL:CCY:AMOUNT, repeatable"),
                        )
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(json_flags(Command::new("list").about("List snapshots"))),
        )
        .subcommand(flow_cmd("receivable", "accounts receivable"))
        .subcommand(flow_cmd("payable", "accounts payable"))
        .subcommand(
            Command::new("budget")
                .about("Category-level monthly budget")
                .subcommand(
                    Command::new("set")
                        .about("Set planned amounts for (month, category)")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("inflow").long("inflow").default_value("0").help("Planned inflow, major units"))
                        .arg(Arg::new("outflow").long("outflow").default_value("0").help("Planned outflow, major units"))
                        .arg(Arg::new("currency").long("currency").help("Defaults to the base currency")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List budget lines")
                        .arg(Arg::new("month").long("month").help("YYYY-MM")),
                ))
                .subcommand(
                    Command::new("copy-last")
                        .about("Copy the previous month's lines into a month, keeping existing pairs")
                        .arg(Arg::new("month").long("month").required(true).help("Target month, YYYY-MM")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove one budget line")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(Arg::new("category").long("category").required(true)),
                ),
        )
        .subcommand(json_flags(
            Command::new("forecast")
                .about("Month-by-month forecast vs. actual reconciliation")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .help("Horizon in months, clamped to 1..=36 (default 12)"),
                )
                .arg(
                    Arg::new("threshold")
                        .long("threshold")
                        .help("Variance highlight threshold in major units (default 500)"),
                )
                .arg(
                    Arg::new("budget")
                        .long("budget")
                        .action(ArgAction::SetTrue)
                        .help("Fold the monthly budget into the forecast track"),
                ),
        ))
        .subcommand(
            Command::new("fx")
                .about("Reporting currency and exchange rates")
                .subcommand(
                    Command::new("set-base")
                        .about("Set the reporting currency")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("set-rate")
                        .about("Set the rate from a currency to the reporting currency")
                        .arg(Arg::new("currency").required(true))
                        .arg(Arg::new("rate").required(true)),
                )
                .subcommand(Command::new("list").about("Show the base currency and configured rates"))
                .subcommand(
                    Command::new("convert")
                        .about("Convert a major-unit amount into the reporting currency")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true)),
                )
                .subcommand(
                    Command::new("fetch")
                        .about("Fetch current rates for currencies present in the ledger"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import records from CSV (date,description,amount,currency)")
                .subcommand(
                    Command::new("receivables")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("payables").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records or the forecast to a file")
                .subcommand(export_target("receivables"))
                .subcommand(export_target("payables"))
                .subcommand(export_target("budgets"))
                .subcommand(
                    export_target("forecast")
                        .arg(Arg::new("months").long("months"))
                        .arg(
                            Arg::new("budget")
                                .long("budget")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger integrity"))
}
