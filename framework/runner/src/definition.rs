use anyhow::Context;
use paging_bench_summary_model::QueryCatalog;

use crate::cli::BenchCli;
use crate::config::BenchConfig;

/// The builder for a benchmark definition.
///
/// This must be used at the start of a benchmark binary to define the catalog that you want to run.
#[derive(Debug)]
pub struct BenchDefinitionBuilder {
    /// The name of the benchmark, used in logs.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: BenchCli,
    /// The catalog to run when no `--catalog` file is given on the command line.
    catalog: QueryCatalog,
}

#[derive(Debug)]
pub(crate) struct BenchDefinition {
    pub name: String,
    pub config: BenchConfig,
    pub catalog: QueryCatalog,
}

impl BenchDefinitionBuilder {
    /// Initialise a new benchmark definition from the benchmark name and command line arguments.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, crate::init::init())
    }

    /// Initialise a new benchmark definition from already parsed command line arguments.
    pub fn new(name: &str, cli: BenchCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            catalog: QueryCatalog::new(),
        }
    }

    /// Set the default catalog [BenchDefinitionBuilder::catalog] for this benchmark.
    pub fn with_catalog(mut self, catalog: QueryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<BenchDefinition> {
        let config = BenchConfig::from_cli(&self.cli)?;

        let catalog = match &self.cli.catalog {
            Some(path) => {
                log::info!("Loading catalog from {}", path.display());
                QueryCatalog::load(path)
                    .with_context(|| format!("Failed to load catalog {}", path.display()))?
            }
            None => self.catalog,
        };
        catalog.validate()?;

        let catalog = catalog.retain_named(&self.cli.scenario);
        if catalog.is_empty() {
            anyhow::bail!("No scenarios to run, check the catalog and the --scenario filter");
        }

        Ok(BenchDefinition {
            name: self.name,
            config,
            catalog,
        })
    }
}
