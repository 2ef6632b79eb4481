use std::{
    fs::File,
    io::{self, Write},
    process,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use google_cloud_storage::client::ClientConfig;
use tracing::{error, info, span, Level};

use objectstore::{
    adapters,
    model::fs::FSError,
    util::object::{parse_bucket_from_uri, parse_prefix_from_uri, parse_provider_from_uri, Provider},
    StorageAdapter, StorageDriver, Visibility,
};

fn command() -> Command {
    let path = || Arg::new("PATH").required(true).index(1);
    let from_to = |name: &'static str| {
        Command::new(name)
            .arg(Arg::new("FROM").required(true).index(1))
            .arg(Arg::new("TO").required(true).index(2))
    };

    Command::new("objectstore")
        .version(clap::crate_version!())
        .arg(Arg::new("BUCKET_URI").required(true).index(1))
        .arg(Arg::new("prefix").long("prefix").global(true))
        .subcommand_required(true)
        .subcommand(
            Command::new("ls")
                .arg(Arg::new("DIR").index(1))
                .arg(
                    Arg::new("recursive")
                        .short('r')
                        .long("recursive")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("cat").arg(path()))
        .subcommand(
            Command::new("put")
                .arg(path())
                .arg(Arg::new("FILE").required(true).index(2)),
        )
        .subcommand(Command::new("rm").arg(path()))
        .subcommand(Command::new("rmdir").arg(Arg::new("DIR").required(true).index(1)))
        .subcommand(Command::new("mkdir").arg(Arg::new("DIR").required(true).index(1)))
        .subcommand(from_to("cp"))
        .subcommand(from_to("mv"))
        .subcommand(Command::new("stat").arg(path()))
        .subcommand(Command::new("exists").arg(path()))
        .subcommand(Command::new("get-acl").arg(path()))
        .subcommand(
            Command::new("set-acl")
                .arg(path())
                .arg(Arg::new("VISIBILITY").required(true).index(2)),
        )
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or("")
}

fn resolve_prefix<'a>(bucket_uri: &'a str, flag: Option<&'a str>) -> &'a str {
    flag.unwrap_or_else(|| parse_prefix_from_uri(bucket_uri))
}

async fn client_for(provider: &Provider) -> Result<Box<dyn adapters::Object>, FSError> {
    match provider {
        Provider::AWS => {
            let config = aws_config::load_from_env().await;
            Ok(Box::new(aws_sdk_s3::Client::new(&config)))
        }
        Provider::GCS => {
            let config = ClientConfig::default().with_auth().await.map_err(|err| {
                FSError::backend(format!("failed to load gcs credentials: {}", err))
            })?;
            Ok(Box::new(google_cloud_storage::client::Client::new(config)))
        }
    }
}

fn run(fs: &StorageAdapter, matches: &ArgMatches) -> Result<(), FSError> {
    let mut out = io::stdout().lock();

    match matches.subcommand() {
        Some(("ls", sub)) => {
            for entry in fs.list_contents(arg(sub, "DIR"), sub.get_flag("recursive"))? {
                writeln!(out, "{}", entry.path)?;
            }
        }
        Some(("cat", sub)) => {
            let mut reader = fs.read_stream(arg(sub, "PATH"))?;
            io::copy(&mut reader, &mut out)?;
        }
        Some(("put", sub)) => {
            let file = File::open(arg(sub, "FILE"))?;
            let obj = fs.write_stream(arg(sub, "PATH"), Box::new(file))?;
            writeln!(out, "{}\t{}", obj.key, obj.size)?;
        }
        Some(("rm", sub)) => {
            if !fs.delete(arg(sub, "PATH"))? {
                writeln!(out, "not found: {}", arg(sub, "PATH"))?;
            }
        }
        Some(("rmdir", sub)) => {
            fs.delete_dir(arg(sub, "DIR"))?;
        }
        Some(("mkdir", sub)) => {
            fs.create_dir(arg(sub, "DIR"))?;
        }
        Some(("cp", sub)) => {
            let obj = fs.copy(arg(sub, "FROM"), arg(sub, "TO"))?;
            writeln!(out, "{}", obj.key)?;
        }
        Some(("mv", sub)) => {
            let obj = fs.rename(arg(sub, "FROM"), arg(sub, "TO"))?;
            writeln!(out, "{}", obj.key)?;
        }
        Some(("stat", sub)) => {
            let meta = fs.get_metadata(arg(sub, "PATH"))?;
            writeln!(out, "key\t{}", meta.key)?;
            writeln!(out, "size\t{}", meta.size)?;
            writeln!(out, "mimetype\t{}", meta.content_type.as_deref().unwrap_or_default())?;
            writeln!(
                out,
                "timestamp\t{}",
                meta.timestamp().map(|t| t.to_string()).unwrap_or_default()
            )?;
        }
        Some(("exists", sub)) => {
            writeln!(out, "{}", fs.has(arg(sub, "PATH"))?)?;
        }
        Some(("get-acl", sub)) => {
            for entry in fs.get_visibility(arg(sub, "PATH"))? {
                writeln!(out, "{}\t{}", entry.entity, entry.role)?;
            }
        }
        Some(("set-acl", sub)) => {
            let visibility: Visibility = arg(sub, "VISIBILITY").parse()?;
            fs.set_visibility(arg(sub, "PATH"), visibility)?;
        }
        _ => {
            return Err(FSError::Unsupported {
                message: "missing command".to_string(),
            })
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().json().init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let matches = command().get_matches();

    let bucket_uri = arg(&matches, "BUCKET_URI").to_string();
    let provider = match parse_provider_from_uri(&bucket_uri) {
        Err(err) => {
            error!(error_message=%err, error_group="parse_provider");
            process::exit(1);
        }
        Ok(provider) => provider,
    };
    let bucket = parse_bucket_from_uri(&bucket_uri);
    let prefix = resolve_prefix(
        &bucket_uri,
        matches.get_one::<String>("prefix").map(String::as_str),
    );
    info!(bucket = bucket, prefix = prefix, "args");

    let client = match client_for(&provider).await {
        Err(err) => {
            error!(error_message=%err, error_group="client");
            process::exit(1);
        }
        Ok(client) => client,
    };

    let fs = StorageAdapter::new(client, bucket, prefix);

    let res = tokio::task::spawn_blocking(move || run(&fs, &matches)).await;

    match res {
        Err(err) => {
            error!(error_message=%err, error_group="join");
            process::exit(1);
        }
        Ok(Err(err)) => {
            error!(error_message=%err, error_group="command");
            process::exit(1);
        }
        Ok(Ok(())) => {}
    }
}
