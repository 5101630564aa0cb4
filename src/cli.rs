use crate::core::Country;
use crate::core::discovery::DEFAULT_TARGET;
use crate::core::download::DEFAULT_OUTPUT_DIR;
use crate::core::links::DEFAULT_LINKS_FILE;
use crate::core::store::DEFAULT_DATABASE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelscout")]
#[command(about = "Short-form video channel finder and scene analyzer")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the model for pet channels and merge them into the CSV database
    Channels {
        /// Search keywords (comma-separated)
        #[arg(short, long)]
        keywords: String,

        /// Number of channels to request per country
        #[arg(short, long, default_value_t = DEFAULT_TARGET)]
        target: usize,

        /// Countries to search (comma-separated)
        #[arg(
            short,
            long,
            value_enum,
            value_delimiter = ',',
            ignore_case = true,
            default_value = "US"
        )]
        country: Vec<Country>,

        /// Channel database file
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,
    },

    /// Download videos and describe them scene by scene
    Process {
        /// Process a single video URL instead of the links file
        #[arg(short, long)]
        single_link: Option<String>,

        /// File with one video URL per line
        #[arg(short, long, default_value = DEFAULT_LINKS_FILE)]
        links_file: PathBuf,

        /// Directory for downloaded videos
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Metadata output file (defaults depend on single or batch mode)
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Send one extracted frame instead of the whole video
        #[arg(long)]
        frame: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_defaults() {
        let cli = Cli::try_parse_from(["reelscout", "channels", "-k", "pets"]).unwrap();
        match cli.command {
            Commands::Channels { keywords, target, country, db } => {
                assert_eq!(keywords, "pets");
                assert_eq!(target, 20);
                assert_eq!(country, vec![Country::Us]);
                assert_eq!(db, PathBuf::from("pet_channels.csv"));
            }
            Commands::Process { .. } => panic!("expected channels"),
        }
    }

    #[test]
    fn countries_are_comma_separated_and_case_insensitive() {
        let cli =
            Cli::try_parse_from(["reelscout", "channels", "-k", "cats", "-c", "in,VN"]).unwrap();
        let Commands::Channels { country, .. } = cli.command else {
            panic!("expected channels");
        };
        assert_eq!(country, vec![Country::In, Country::Vn]);
    }

    #[test]
    fn unknown_country_is_rejected() {
        assert!(Cli::try_parse_from(["reelscout", "channels", "-k", "cats", "-c", "FR"]).is_err());
    }

    #[test]
    fn keywords_are_required() {
        assert!(Cli::try_parse_from(["reelscout", "channels"]).is_err());
    }

    #[test]
    fn process_defaults() {
        let cli = Cli::try_parse_from(["reelscout", "process"]).unwrap();
        let Commands::Process {
            single_link,
            links_file,
            output_dir,
            metadata,
            frame,
        } = cli.command
        else {
            panic!("expected process");
        };
        assert_eq!(single_link, None);
        assert_eq!(links_file, PathBuf::from("links.txt"));
        assert_eq!(output_dir, PathBuf::from("downloads"));
        assert_eq!(metadata, None);
        assert!(!frame);
    }
}
