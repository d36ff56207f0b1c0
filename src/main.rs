use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use modpacker::services::finder;
use modpacker::services::pipeline::{
    CancelToken, ChannelObserver, ExtractionPipeline, Packer, PipelineEvent,
};
use modpacker::services::remote::{CatalogClient, NullCatalog, SolderClient};
use modpacker::services::store::ModStore;

/// Discover, deduplicate and repackage mod archives
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory tree to scan for mod archives
    #[arg(short, long)]
    input: PathBuf,

    /// Directory to write output archives and the manifest into
    #[arg(short, long)]
    output: PathBuf,

    /// Game version stamped on mods that do not declare one
    #[arg(short, long)]
    game_version: String,

    /// Store snapshot file (defaults to the per-user data directory)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Base URL of a Solder-style mod catalog
    #[arg(long)]
    remote: Option<String>,

    /// Concurrent units of work
    #[arg(short, long, default_value_t = 8)]
    jobs: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store_path = match args.store {
        Some(path) => path,
        None => ModStore::default_path()?,
    };
    let store = Arc::new(Mutex::new(
        ModStore::load(&store_path)
            .with_context(|| format!("loading store snapshot {}", store_path.display()))?,
    ));

    let remote: Arc<dyn CatalogClient> = match &args.remote {
        Some(url) => match SolderClient::connect(url).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("Catalog at {url} is unreachable, running offline: {e}");
                Arc::new(NullCatalog)
            }
        },
        None => Arc::new(NullCatalog),
    };

    let files = finder::find_mod_files(&args.input)?;
    info!("Found {} candidate mod files", files.len());

    let (observer, mut events) = ChannelObserver::new();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PipelineEvent::FileStarted(path) => info!("Processing {}", path.display()),
                PipelineEvent::DescriptorParseFailed(path) => {
                    warn!("No usable descriptor in {}", path.display())
                }
                PipelineEvent::RemoteLookupFailed(path) => {
                    warn!("Catalog enrichment failed for {}", path.display())
                }
            }
        }
    });

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested, finishing in-flight work");
                cancel.cancel();
            }
        });
    }

    let pipeline = ExtractionPipeline::new(&args.game_version)
        .with_concurrency(args.jobs)
        .with_observer(Arc::new(observer));
    let records = pipeline
        .extract_all(files, store.clone(), remote.clone(), cancel)
        .await;

    let complete = records.iter().filter(|r| r.is_complete()).count();
    info!(
        "Extracted {} records ({} complete, {} incomplete)",
        records.len(),
        complete,
        records.len() - complete
    );

    let packer = Packer::new(&args.output).with_concurrency(args.jobs);
    let packed = packer.pack_all(records, store, remote).await?;
    let published = packed.iter().filter(|r| r.published).count();

    std::fs::create_dir_all(&args.output)?;
    let manifest_path = args.output.join("modlist.html");
    std::fs::write(&manifest_path, packer.manifest_html())
        .with_context(|| format!("writing manifest {}", manifest_path.display()))?;

    info!(
        "Packed {published} mods into {}; manifest at {}",
        args.output.display(),
        manifest_path.display()
    );
    Ok(())
}
