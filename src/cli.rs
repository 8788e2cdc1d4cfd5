//! Interface de linha de comando do stitchsort baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (categorize,
//! convert, check) e a flag global --verbose.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::category::Locale;

/// stitchsort — categorizador de bordados .PES com IA.
#[derive(Debug, Parser)]
#[command(name = "stitchsort", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Idioma aceito pela CLI, mapeado para [`Locale`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    /// Nomes de pastas em inglês.
    En,
    /// Nomes de pastas em português brasileiro.
    #[value(name = "pt-BR")]
    PtBr,
}

impl From<LanguageArg> for Locale {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Locale::En,
            LanguageArg::PtBr => Locale::PtBr,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Categoriza os arquivos .PES de um diretório usando IA.
    Categorize {
        /// Diretório contendo os arquivos .PES a categorizar.
        source_dir: PathBuf,

        /// Diretório de saída (padrão: SOURCE_DIR/categorized).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Idioma para os nomes das pastas.
        #[arg(long, short = 'l', value_enum, default_value = "en")]
        language: LanguageArg,

        /// Simula a execução sem copiar arquivos.
        #[arg(long)]
        dry_run: bool,

        /// Retoma o processamento após o item de número N.
        #[arg(long)]
        start_after: Option<u32>,
    },

    /// Converte um único arquivo .PES para JPG.
    Convert {
        /// Arquivo .PES a converter.
        file: PathBuf,

        /// Arquivo JPG de saída (padrão: mesmo nome com extensão .jpg).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verifica se as dependências e a configuração estão corretas.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_categorize_subcommand() {
        let cli = Cli::parse_from(["stitchsort", "categorize", "./designs"]);
        match cli.command {
            Command::Categorize {
                source_dir,
                output,
                language,
                dry_run,
                start_after,
            } => {
                assert_eq!(source_dir, PathBuf::from("./designs"));
                assert!(output.is_none());
                assert!(matches!(language, LanguageArg::En));
                assert!(!dry_run);
                assert!(start_after.is_none());
            }
            _ => panic!("expected Categorize command"),
        }
    }

    #[test]
    fn cli_parses_categorize_flags() {
        let cli = Cli::parse_from([
            "stitchsort",
            "categorize",
            "./designs",
            "--output",
            "./sorted",
            "--language",
            "pt-BR",
            "--dry-run",
            "--start-after",
            "500",
            "--verbose",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Categorize {
                output,
                language,
                dry_run,
                start_after,
                ..
            } => {
                assert_eq!(output.unwrap(), PathBuf::from("./sorted"));
                assert!(matches!(language, LanguageArg::PtBr));
                assert!(dry_run);
                assert_eq!(start_after, Some(500));
            }
            _ => panic!("expected Categorize command"),
        }
    }

    #[test]
    fn cli_parses_convert_subcommand() {
        let cli = Cli::parse_from(["stitchsort", "convert", "bear.pes", "-o", "bear.jpg"]);
        match cli.command {
            Command::Convert { file, output } => {
                assert_eq!(file, PathBuf::from("bear.pes"));
                assert_eq!(output.unwrap(), PathBuf::from("bear.jpg"));
            }
            _ => panic!("expected Convert command"),
        }
    }

    #[test]
    fn cli_parses_check_subcommand() {
        let cli = Cli::parse_from(["stitchsort", "check"]);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn language_arg_maps_to_locale() {
        assert_eq!(Locale::from(LanguageArg::En), Locale::En);
        assert_eq!(Locale::from(LanguageArg::PtBr), Locale::PtBr);
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
