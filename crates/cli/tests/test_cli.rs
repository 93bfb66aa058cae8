use clap::Parser;
use licenser_cli::{Cli, Commands, OutputFormat};

#[test]
fn activate_takes_the_key() {
    let cli = Cli::try_parse_from(["licenser", "activate", "ABCD-1234"]).unwrap();
    assert!(matches!(cli.command, Commands::Activate { ref key } if key == "ABCD-1234"));
    assert_eq!(cli.format, OutputFormat::Terminal);
    assert!(!cli.verbose);
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "licenser",
        "status",
        "--format",
        "json",
        "-v",
        "--config",
        "/etc/licenser.toml",
    ])
    .unwrap();
    assert!(matches!(cli.command, Commands::Status));
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(cli.verbose);
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/etc/licenser.toml"))
    );
}

#[test]
fn check_attr_and_value_go_together() {
    assert!(Cli::try_parse_from(["licenser", "check", "--attr", "title"]).is_err());
    assert!(Cli::try_parse_from(["licenser", "check", "--value", "Pro"]).is_err());

    let cli =
        Cli::try_parse_from(["licenser", "check", "--attr", "title", "--value", "Pro"]).unwrap();
    match cli.command {
        Commands::Check { attr, value } => {
            assert_eq!(attr.as_deref(), Some("title"));
            assert_eq!(value.as_deref(), Some("Pro"));
        }
        _ => panic!("expected check"),
    }
}

#[test]
fn deactivate_prompts_unless_yes() {
    let cli = Cli::try_parse_from(["licenser", "deactivate"]).unwrap();
    assert!(matches!(cli.command, Commands::Deactivate { yes: false }));

    let cli = Cli::try_parse_from(["licenser", "deactivate", "--yes"]).unwrap();
    assert!(matches!(cli.command, Commands::Deactivate { yes: true }));
}

#[test]
fn a_subcommand_is_required() {
    assert!(Cli::try_parse_from(["licenser"]).is_err());
}
