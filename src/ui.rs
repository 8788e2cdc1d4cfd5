//! Interface de terminal do stitchsort — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`BatchProgress`] acompanha visualmente a
//! execução de um lote e imprime o resumo final.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::category::localized_name;
use crate::pipeline::{RunConfiguration, RunSummary};

/// Indicador visual de progresso para a execução de um lote no terminal.
///
/// Exibe um spinner animado durante o processamento e mensagens
/// coloridas para sucesso (verde), falha (vermelho) e avisos (amarelo).
pub struct BatchProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
    // Estilo amarelo para avisos.
    yellow: Style,
}

impl BatchProgress {
    /// Inicia o spinner com o diretório de origem e retorna a instância.
    pub fn start(source: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Categorizing designs in {source}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e imprime o resumo da execução.
    pub fn finish(&self, summary: &RunSummary, config: &RunConfiguration) {
        self.pb.finish_and_clear();

        if summary.cancelled {
            println!(
                "  {} Run cancelled; completed items were kept",
                self.yellow.apply_to("⚠")
            );
        } else if summary.failed == 0 {
            println!("  {} Categorization completed", self.green.apply_to("✓"));
        } else {
            println!(
                "  {} Categorization completed with {} failure(s)",
                self.yellow.apply_to("⚠"),
                summary.failed
            );
        }

        println!();
        println!("  Files discovered: {}", summary.discovered);
        if summary.skipped > 0 {
            println!("  Skipped (resume): {}", summary.skipped);
        }
        println!("  Placed:           {}", summary.placed);
        println!("  Failed:           {}", summary.failed);

        if !summary.categories.is_empty() {
            println!("  Categories:");
            for key in &summary.categories {
                println!("    - {}", localized_name(*key, config.locale));
            }
        }

        if config.dry_run && !summary.planned.is_empty() {
            println!();
            println!(
                "  {} Dry run — planned placements:",
                self.yellow.apply_to("🔍")
            );
            for plan in &summary.planned {
                println!("    #{:04} → {}", plan.sequence_index, plan.destination.display());
            }
        }

        if !summary.failures.is_empty() {
            println!();
            println!("  {} Failures:", self.red.apply_to("✗"));
            for failure in summary.failures.iter().take(5) {
                println!(
                    "    #{:04} {} [{}]: {}",
                    failure.sequence_index,
                    failure.path.display(),
                    failure.stage,
                    failure.reason
                );
            }
            if summary.failures.len() > 5 {
                println!(
                    "    ... and {} more (see the run log for details)",
                    summary.failures.len() - 5
                );
            }
        }

        if !config.dry_run {
            println!();
            println!("  Files organized in: {}", config.dest_dir.display());
        }
    }
}
