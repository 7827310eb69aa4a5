// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: tree root directory
fn root_arg() -> Arg {
    Arg::new("root")
        .required(true)
        .value_name("ROOT")
        .help("Root directory of the tree")
}

fn build_cli() -> Command {
    Command::new("booster")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Booster Contributors")
        .about("Transparent, round-trip verified gzip decompression of file trees")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Disable the progress bar"),
        )
        .subcommand(
            Command::new("decompress")
                .about("Create verified shadow copies of gzip files")
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("recompress")
                .about("Regenerate originals that are missing next to their shadows")
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("view")
                .about("Print the logical view of a tree")
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Check whether a single file round-trips")
                .arg(Arg::new("file").required(true).help("File to check")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("booster.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
