use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize as _, Stream};
use std::fs;
use std::path::PathBuf;
use std::process;

use templatewiz_lib::{ExtractionPipeline, ExtractorConfig, Palette};
use url::Url;

const TEMPLATEWIZ_INTRO: &str = r#"
      ______                     __      __      _       ___
     /_  __/__  ____ ___  ____  / /___ _/ /____ | |     / (_)___
      / / / _ \/ __ `__ \/ __ \/ / __ `/ __/ _ \| | /| / / /_  /
     / / /  __/ / / / / / /_/ / / /_/ / /_/  __/| |/ |/ / / / /_
    /_/  \___/_/ /_/ /_/ .___/_/\__,_/\__/\___/ |__/|__/_/ /___/
                      /_/

    TemplateWiz - brand colors and fonts from any website
"#;

#[derive(Parser)]
#[command(name = "TemplateWiz")]
#[command(about = "Extract a website's brand palette, or restyle an email after an article")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the colors and fonts used by a website.
    Colors {
        /// Page to analyze.
        url: String,

        /// Print the palette as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Rewrite an email in the writing style of a reference article.
    Restyle {
        /// File containing the email to rewrite.
        #[arg(long)]
        email: PathBuf,

        /// URL of the article whose style should be copied.
        #[arg(long)]
        reference: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // parse the args given in terminal
    let args: Args = Args::parse();

    let config = match ExtractorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(2);
        }
    };
    let pipeline = match ExtractionPipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Could not start: {e}");
            process::exit(2);
        }
    };

    match args.command {
        Command::Colors { url, json } => {
            if !json {
                println!("{}", TEMPLATEWIZ_INTRO);
            }
            match pipeline.fetch_colors_from_url(&url) {
                Ok(palette) if json => match serde_json::to_string_pretty(&palette) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("Could not serialize the palette: {e}");
                        process::exit(1);
                    }
                },
                Ok(palette) => print_palette(&palette),
                Err(e) => {
                    log::error!("{e}");
                    eprintln!("Couldn't fetch the colors. Make sure the URL is correct.");
                    process::exit(1);
                }
            }
        }
        Command::Restyle { email, reference } => {
            let original = match fs::read_to_string(&email) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Error reading email file {}: {e}", email.display());
                    process::exit(1);
                }
            };
            let reference = match Url::parse(&reference) {
                Ok(url) => url,
                Err(e) => {
                    eprintln!("{reference:?} is not a valid URL: {e}");
                    process::exit(1);
                }
            };
            match pipeline.apply_writing_style(&original, &reference) {
                Ok(rewritten) => println!("{rewritten}"),
                Err(e) => {
                    eprintln!("Couldn't rewrite the email: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

fn print_palette(palette: &Palette) {
    if palette.is_empty() {
        println!("No colors or fonts found.");
        return;
    }
    for (attr, values) in palette.iter() {
        println!("{}", attr.if_supports_color(Stream::Stdout, |s| s.bold()));
        for value in values {
            match parse_hex(value) {
                Some((r, g, b)) => println!(
                    "  {} {value}",
                    "    ".if_supports_color(Stream::Stdout, |s| s.on_truecolor(r, g, b))
                ),
                None => println!("  {value}"),
            }
        }
    }
}

/// `#rgb` or `#rrggbb` to its components.
fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..=i].repeat(2));
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_hex;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex("#ff5500"), Some((255, 85, 0)));
        assert_eq!(parse_hex("#FFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex("inter"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#ggg"), None);
    }
}
