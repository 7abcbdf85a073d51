use std::{fs, io::Write};

use clap::Parser;
use cidrscout::{
    cli::{Args, Backend, ExportFormat, Settings, SettingsLoader, read_domains},
    error::ScoutError,
    export::{render_domain_list, render_subnet_export},
    net::{DnsLookup, DohLookup, ResolutionCache, SystemLookup},
    registry::DomainRegistry,
    session::Session,
};

#[tokio::main]
async fn main() -> Result<(), ScoutError> {
    env_logger::init();

    let args = Args::parse();
    let settings = SettingsLoader::load(&args)?;
    let domains = read_domains(args.input.as_deref(), &args.domains)?;

    if domains.is_empty() {
        log::warn!("No domains given. Pass them as arguments or with --input.");
        return Ok(());
    }

    match settings.backend {
        Backend::Doh => {
            let lookup = DohLookup::new(settings.endpoint.clone(), settings.timeout)?;
            run(lookup, &settings, &args, &domains).await
        }
        Backend::System => run(SystemLookup::new()?, &settings, &args, &domains).await,
    }
}

async fn run<L: DnsLookup>(
    lookup: L,
    settings: &Settings,
    args: &Args,
    domains: &[String],
) -> Result<(), ScoutError> {
    let cache = ResolutionCache::with_policy(lookup, settings.cache);
    let registry = DomainRegistry::new(settings.merge_threshold);
    let mut session = Session::new(cache, registry, settings.batch_size);

    for domain in domains {
        session.observe(domain);
    }

    let stats = session
        .resolve_pending(|done, total| log::info!("Resolved {done}/{total} domains"))
        .await;

    let content = match args.format {
        ExportFormat::Subnets => render_subnet_export(session.registry()),
        ExportFormat::Domains => render_domain_list(session.registry()),
    };
    if content.is_empty() {
        log::warn!("No IP subnets to export.");
    } else if let Some(path) = &args.output {
        fs::write(path, &content)?;
        log::info!("Export written to {}", path.display());
    } else {
        std::io::stdout().write_all(content.as_bytes())?;
    }

    log::info!(
        "{} requests, {} unique domains, {} resolved IPs",
        stats.total_requests,
        stats.unique_domains,
        stats.resolved_ips
    );
    Ok(())
}
