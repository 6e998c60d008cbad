use std::{
    fs::File,
    io::{self, Write},
};

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{info, span, Level};
use tracing_subscriber::EnvFilter;

use objectfs_adapter::{
    adapters::s3::{S3Client, S3Settings},
    util::object::parse_bucket_uri,
    Config, FilesystemAdapter, ObjectFS, StorageAttributes,
};

fn cli() -> Command {
    let path = || Arg::new("PATH").required(true);

    Command::new("objectfs")
        .version(clap::crate_version!())
        .about("Filesystem operations against an object storage bucket")
        .arg(Arg::new("endpoint").long("endpoint").value_name("URL"))
        .arg(Arg::new("region").long("region").value_name("REGION"))
        .arg(
            Arg::new("path-style")
                .long("path-style")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("BUCKET_URI")
                .required(true)
                .help("s3://bucket[/prefix] or oss://bucket[/prefix]"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("ls")
                .arg(Arg::new("PATH").default_value(""))
                .arg(
                    Arg::new("recursive")
                        .long("recursive")
                        .short('r')
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("cat").arg(path()))
        .subcommand(
            Command::new("put")
                .arg(path())
                .arg(Arg::new("FILE").required(true)),
        )
        .subcommand(Command::new("rm").arg(path()))
        .subcommand(Command::new("rmdir").arg(path()))
        .subcommand(Command::new("mkdir").arg(path()))
        .subcommand(
            Command::new("cp")
                .arg(Arg::new("SRC").required(true))
                .arg(Arg::new("DST").required(true)),
        )
        .subcommand(
            Command::new("mv")
                .arg(Arg::new("SRC").required(true))
                .arg(Arg::new("DST").required(true)),
        )
        .subcommand(Command::new("stat").arg(path()))
        .subcommand(Command::new("url").arg(path()))
        .subcommand(Command::new("exists").arg(path()))
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument: {}", name))
}

fn describe(entry: &StorageAttributes) -> String {
    match entry {
        StorageAttributes::File(file) => format!(
            "file\t{}\t{}\t{}",
            file.file_size().map(|size| size.to_string()).unwrap_or_default(),
            file.last_modified().map(|time| time.to_string()).unwrap_or_default(),
            file.path()
        ),
        StorageAttributes::Directory(dir) => format!(
            "dir\t\t{}\t{}/",
            dir.last_modified().map(|time| time.to_string()).unwrap_or_default(),
            dir.path()
        ),
    }
}

fn run(fs: &ObjectFS, command: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    let config = Config::new();

    match command {
        "ls" => {
            let path = arg(matches, "PATH")?;
            for entry in fs.list_contents(path, matches.get_flag("recursive")) {
                writeln!(stdout, "{}", describe(&entry?))?;
            }
        }
        "cat" => {
            let contents = fs.read(arg(matches, "PATH")?)?;
            stdout.write_all(&contents)?;
        }
        "put" => {
            let file = arg(matches, "FILE")?;
            let mut reader = File::open(file).with_context(|| format!("failed to open: {}", file))?;
            fs.write_stream(arg(matches, "PATH")?, &mut reader, &config)?;
        }
        "rm" => fs.delete(arg(matches, "PATH")?)?,
        "rmdir" => fs.delete_directory(arg(matches, "PATH")?)?,
        "mkdir" => fs.create_directory(arg(matches, "PATH")?, &config)?,
        "cp" => fs.copy(arg(matches, "SRC")?, arg(matches, "DST")?, &config)?,
        "mv" => fs.move_file(arg(matches, "SRC")?, arg(matches, "DST")?, &config)?,
        "stat" => {
            let path = arg(matches, "PATH")?;
            let size = fs.file_size(path)?;
            let mime_type = fs.mime_type(path).ok();
            writeln!(
                stdout,
                "path: {}\nsize: {}\nlast_modified: {}\nmime_type: {}",
                size.path(),
                size.file_size().unwrap_or_default(),
                size.last_modified().map(|time| time.to_string()).unwrap_or_default(),
                mime_type
                    .as_ref()
                    .and_then(|attributes| attributes.mime_type())
                    .unwrap_or("unknown")
            )?;
        }
        "url" => writeln!(stdout, "{}", fs.get_url(arg(matches, "PATH")?)?)?,
        "exists" => {
            let path = arg(matches, "PATH")?;
            let found = fs.file_exists(path)? || fs.directory_exists(path)?;
            writeln!(stdout, "{}", found)?;
        }
        other => bail!("unknown command: {}", other),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let matches = cli().get_matches();

    let bucket_uri = parse_bucket_uri(arg(&matches, "BUCKET_URI")?)?;
    let region = matches.get_one::<String>("region").cloned();
    let endpoint = matches
        .get_one::<String>("endpoint")
        .cloned()
        .or_else(|| bucket_uri.provider.default_endpoint(region.as_deref()));
    info!(bucket = %bucket_uri.bucket, prefix = %bucket_uri.prefix, endpoint = ?endpoint, "args");

    let settings = S3Settings {
        region,
        endpoint,
        force_path_style: matches.get_flag("path-style"),
    };
    let client = S3Client::from_settings(&settings).context("failed to build object storage client")?;
    let fs = ObjectFS::new(Box::new(client), &bucket_uri.bucket, &bucket_uri.prefix);

    let Some((command, sub_matches)) = matches.subcommand() else {
        bail!("no command given");
    };

    run(&fs, command, sub_matches)
}
