use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;

use jobinsight::client::config::ApiConfig;
use jobinsight::client::services::api_client::ApiClient;
use jobinsight::client::services::city_service::{CityService, DEFAULT_LIMIT, DEFAULT_MIN_JOBS};
use jobinsight::client::services::experience_service::ExperienceService;
use jobinsight::client::services::industry_service::IndustryService;
use jobinsight::client::services::overview_service::OverviewService;
use jobinsight::client::services::position_service::{PositionService, SankeyMode};
use jobinsight::client::services::q1_service::Q1Service;
use jobinsight::client::services::salary_service::{BoxplotFilters, SalaryService};
use jobinsight::common::error::ApiResult;
use jobinsight::utils::logger::DashboardLogger;

#[derive(Parser)]
#[command(name = "jobinsight-probe")]
#[command(about = "Query the job analytics backend from the command line")]
struct Args {
    /// Overrides API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Overrides API_TIMEOUT_MS
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset summary
    Overview,
    /// City analysis, one city's detail, or a comparison
    City {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = DEFAULT_MIN_JOBS)]
        min_jobs: u32,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long, num_args = 1..)]
        compare: Vec<String>,
    },
    /// Industry analysis, salary, rankings and national stats
    Industry {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = DEFAULT_MIN_JOBS)]
        min_jobs: u32,
        #[arg(long)]
        salary: bool,
        #[arg(long)]
        ranking: bool,
        #[arg(long)]
        trend: bool,
        #[arg(long)]
        national: bool,
        #[arg(long)]
        overview: bool,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long, num_args = 1..)]
        compare: Vec<String>,
    },
    /// Experience-level analysis
    Experience {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = DEFAULT_MIN_JOBS)]
        min_jobs: u32,
        #[arg(long)]
        salary: bool,
        #[arg(long)]
        overview: bool,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long, num_args = 1..)]
        compare: Vec<String>,
    },
    /// Job-title views: parallel, sankey or nested bar
    Positions {
        #[arg(long = "job-title")]
        job_titles: Vec<String>,
        #[arg(long)]
        sankey: Option<SankeyMode>,
        #[arg(long = "dimension")]
        dimensions: Vec<String>,
        #[arg(long)]
        nested_bar: bool,
        #[arg(long)]
        detail_job: Option<String>,
    },
    /// Salary boxplot, or the 3D experience/education cube with --cube
    Salary {
        #[arg(long)]
        cube: bool,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        company_type: Option<String>,
    },
    /// Q1 cohort data
    Q1 {
        #[command(subcommand)]
        view: Q1View,
    },
}

#[derive(Subcommand)]
enum Q1View {
    Cities,
    Scatter { city: String },
    JobLevels,
    Industries {
        #[arg(long)]
        city: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = DashboardLogger::init() {
        eprintln!("logger already installed: {}", e);
    }

    let args = Args::parse();
    let mut config = ApiConfig::from_env();
    if let Some(base_url) = args.base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    let client = ApiClient::new(config)?;
    info!("Probing {}", client.config().base_url);

    let body = run(&client, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn run(client: &ApiClient, command: Commands) -> ApiResult<Value> {
    match command {
        Commands::Overview => OverviewService::overview(client).await,
        Commands::City { limit, min_jobs, detail, compare } => {
            if let Some(name) = detail {
                CityService::detail(client, &name).await
            } else if !compare.is_empty() {
                CityService::compare(client, &compare).await
            } else {
                CityService::analysis(client, limit, min_jobs).await
            }
        }
        Commands::Industry {
            limit,
            min_jobs,
            salary,
            ranking,
            trend,
            national,
            overview,
            detail,
            compare,
        } => {
            if let Some(name) = detail {
                IndustryService::detail(client, &name).await
            } else if !compare.is_empty() {
                IndustryService::compare(client, &compare).await
            } else if salary {
                IndustryService::salary(client, limit, min_jobs).await
            } else if ranking {
                IndustryService::job_ranking(client).await
            } else if trend {
                IndustryService::trend_rose(client).await
            } else if national {
                IndustryService::national_stats(client).await
            } else if overview {
                IndustryService::overview(client).await
            } else {
                IndustryService::analysis(client, limit, min_jobs).await
            }
        }
        Commands::Experience {
            limit,
            min_jobs,
            salary,
            overview,
            detail,
            compare,
        } => {
            if let Some(level) = detail {
                ExperienceService::detail(client, &level).await
            } else if !compare.is_empty() {
                ExperienceService::compare(client, &compare).await
            } else if salary {
                ExperienceService::salary(client, limit, min_jobs).await
            } else if overview {
                ExperienceService::overview(client).await
            } else {
                ExperienceService::analysis(client, limit, min_jobs).await
            }
        }
        Commands::Positions {
            job_titles,
            sankey,
            dimensions,
            nested_bar,
            detail_job,
        } => {
            if let Some(mode) = sankey {
                PositionService::sankey(client, mode, &job_titles, &dimensions).await
            } else if nested_bar {
                PositionService::nested_bar(client, &job_titles, detail_job.as_deref()).await
            } else {
                PositionService::parallel(client, &job_titles).await
            }
        }
        Commands::Salary {
            cube,
            experience,
            education,
            city,
            company_type,
        } => {
            if cube {
                SalaryService::experience_education_salary(client).await
            } else {
                let filters = BoxplotFilters {
                    experience,
                    education,
                    city,
                    company_type,
                };
                SalaryService::boxplot(client, &filters).await
            }
        }
        Commands::Q1 { view } => match view {
            Q1View::Cities => Q1Service::cities(client).await,
            Q1View::Scatter { city } => Q1Service::scatter(client, &city).await,
            Q1View::JobLevels => Q1Service::job_levels(client).await,
            Q1View::Industries { city } => Q1Service::industries(client, city.as_deref()).await,
        },
    }
}
