use clap::{App, Arg, ArgMatches};
use fontscratch::FontMetrics;
use std::fs::File;
use std::io::{self, Write};
use std::str::FromStr;

/// The default output file name
pub const DEFAULT_OUTPUT: &str = "FontFromScratch.ttf";

pub fn app() -> App<'static, 'static> {
    App::new("fontscratch")
        .about("Builds a minimal TrueType font")
        .arg(
            Arg::with_name("OUTPUT")
                .help("Sets the output file to use (- for stdout)")
                .required(false),
        )
        .arg(
            Arg::with_name("ascent")
                .long("ascent")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Ascender, in font units"),
        )
        .arg(
            Arg::with_name("descent")
                .long("descent")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Descender, in font units (usually negative)"),
        )
        .arg(
            Arg::with_name("upm")
                .long("upm")
                .takes_value(true)
                .help("Units per em"),
        )
        .arg(
            Arg::with_name("family")
                .long("family")
                .takes_value(true)
                .help("Family name"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase logging"),
        )
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String> {
    matches
        .value_of(name)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| format!("Invalid value for --{}: {}", name, v))
        })
        .transpose()
}

/// Applies the command line overrides to the default metrics.
pub fn metrics_from_args(matches: &ArgMatches) -> Result<FontMetrics, String> {
    let mut metrics = FontMetrics::default();
    if let Some(ascent) = parse_arg(matches, "ascent")? {
        metrics.ascent = ascent;
    }
    if let Some(descent) = parse_arg(matches, "descent")? {
        metrics.descent = descent;
    }
    if let Some(upm) = parse_arg::<u16>(matches, "upm")? {
        if !(16..=16384).contains(&upm) {
            return Err(format!("Units per em must be between 16 and 16384, not {}", upm));
        }
        metrics.units_per_em = upm;
    }
    if let Some(family) = matches.value_of("family") {
        metrics.family_name = family.to_string();
    }
    Ok(metrics)
}

/// The default log filter for a given number of `-v` flags.
pub fn log_filter(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Writes the font to the file named on the command line, or to stdout for `-`.
pub fn save_font(bytes: &[u8], matches: &ArgMatches) -> io::Result<()> {
    match matches.value_of("OUTPUT").unwrap_or(DEFAULT_OUTPUT) {
        "-" => io::stdout().write_all(bytes),
        filename => {
            log::info!("Writing {} bytes to {}", bytes.len(), filename);
            File::create(filename)?.write_all(bytes)
        }
    }
}
