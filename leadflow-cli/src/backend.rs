//! Collaborator wiring
//!
//! Builds the Job Store and Job Executor an orchestrator runs against:
//! either the hosted services over HTTP, or an in-memory store driven by
//! the simulated executor.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use leadflow_core::domain::job::JobType;
use leadflow_engine::{InMemoryJobStore, JobExecutor, JobStore, SimulatedExecutor};

use crate::config::Config;

/// Flags selecting and shaping the simulated backend
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Run against an in-memory store and a simulated executor
    #[arg(long)]
    pub simulate: bool,

    /// Job types whose simulated jobs fail (e.g. qualify)
    #[arg(long, value_delimiter = ',', requires = "simulate")]
    pub fail: Vec<JobType>,

    /// Job types whose simulated dispatch is refused
    #[arg(long, value_delimiter = ',', requires = "simulate")]
    pub reject: Vec<JobType>,
}

pub struct Backend {
    pub store: Arc<dyn JobStore>,
    pub executor: Arc<dyn JobExecutor>,
}

impl Backend {
    pub fn from_args(config: &Config, args: &SimulationArgs) -> Self {
        if args.simulate {
            Self::simulated(args)
        } else {
            Self::http(config)
        }
    }

    fn http(config: &Config) -> Self {
        let client = Arc::new(config.client());
        Self {
            store: client.clone(),
            executor: client,
        }
    }

    fn simulated(args: &SimulationArgs) -> Self {
        let store = Arc::new(InMemoryJobStore::new());
        let mut executor =
            SimulatedExecutor::new(Arc::clone(&store)).with_tick(Duration::from_secs(1));

        for job_type in &args.fail {
            executor = executor.failing(*job_type, format!("Simulated {} failure", job_type));
        }
        for job_type in &args.reject {
            executor = executor.rejecting(*job_type);
        }

        Self {
            store,
            executor: Arc::new(executor),
        }
    }
}
