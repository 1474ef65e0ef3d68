use crate::output::{self, ListStyle};
use autojenkins::{
    BuildOutcome, BuildResult, CancellationToken, Error, ErrorKind, Jenkins, ProxyConfig,
    ServerConfig, Variables, WaitOptions, template::parse_assignment,
};
use clap::{Parser, Subcommand};
use std::time::Duration;

const JENKINS_USER: &str = "JENKINS_USER";
const JENKINS_PASSWORD: &str = "JENKINS_PASSWORD";
const JENKINS_PROXY: &str = "JENKINS_PROXY";

#[derive(Parser)]
#[command(author, version, about = "Remote control for Jenkins jobs", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Server address and how to reach it; shared by every command.
#[derive(clap::Args)]
struct Connection {
    #[arg(help = "Jenkins base URL, e.g. http://jenkins.local:8080")]
    host: String,
    #[arg(short, long, env = JENKINS_USER, requires = "password", help = "Username")]
    user: Option<String>,
    #[arg(
        short,
        long,
        env = JENKINS_PASSWORD,
        hide_env_values = true,
        help = "Password or API token"
    )]
    password: Option<String>,
    #[arg(short = 'x', long, env = JENKINS_PROXY, help = "Proxy server (host:port)")]
    proxy: Option<String>,
    #[arg(short = 'k', long, help = "Do not verify TLS certificates")]
    insecure: bool,
    #[arg(short, long, help = "Do not use colored output")]
    no_color: bool,
}

impl Connection {
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(&self.host);
        if let Some(user) = &self.user {
            config = config.with_auth(user, self.password.clone().unwrap_or_default());
        }
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(ProxyConfig::both(proxy));
        }
        if self.insecure {
            config = config.with_verify_tls(false);
        }
        config
    }

    fn connect(&self) -> Result<Jenkins, Error> {
        if self.no_color {
            colored::control::set_override(false);
        }
        Jenkins::from_config(self.server_config())
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(aliases = ["ls"], about = "List all jobs")]
    List {
        #[command(flatten)]
        conn: Connection,
        #[arg(short, long, help = "Print job names only")]
        raw: bool,
    },
    #[command(about = "Create a job from a template job or a config.xml file")]
    Create {
        #[command(flatten)]
        conn: Connection,
        jobname: String,
        #[arg(help = "Template job name, or a file path with --from-file")]
        template: String,
        #[arg(
            short = 'D',
            value_name = "VAR=VALUE",
            value_parser = parse_assignment,
            help = "Substitution variable used in the template"
        )]
        vars: Vec<(String, String)>,
        #[arg(short, long, help = "Start a build after creation")]
        build: bool,
        #[arg(long, help = "Read the template from a local file")]
        from_file: bool,
        #[arg(long, help = "Overwrite the job if it already exists")]
        force: bool,
        #[arg(long, help = "Keep <disabled>true</disabled> from the template")]
        keep_disabled: bool,
    },
    #[command(aliases = ["b"], about = "Trigger a build of an existing job")]
    Build {
        #[command(flatten)]
        conn: Connection,
        jobname: String,
        #[arg(
            short = 'P',
            value_name = "NAME=VALUE",
            value_parser = parse_assignment,
            help = "Build parameter"
        )]
        params: Vec<(String, String)>,
        #[arg(short, long, help = "Wait until the build completes")]
        wait: bool,
        #[arg(long, value_name = "SECS", help = "Give up waiting after this long")]
        timeout: Option<u64>,
        #[arg(
            long,
            value_name = "SECS",
            default_value_t = 10,
            help = "Delay before the first poll"
        )]
        grace: u64,
        #[arg(long, value_name = "SECS", default_value_t = 3, help = "Delay between polls")]
        poll: u64,
    },
    #[command(aliases = ["rm"], about = "Delete jobs")]
    Delete {
        #[command(flatten)]
        conn: Connection,
        #[arg(required = true)]
        jobnames: Vec<String>,
    },
}

/// Errors reported as `Error: ...` with a failing exit code instead of
/// aborting with a trace.
fn is_reported(err: &Error) -> bool {
    err.is_domain_error()
        || matches!(
            err.kind(),
            ErrorKind::NoBuilds | ErrorKind::BuildTimeout | ErrorKind::Cancelled
        )
}

/// Runs the parsed command. `Ok(false)` means the command reported a failure.
pub fn handle() -> anyhow::Result<bool> {
    let args = Args::parse();

    match args.commands {
        Commands::List { conn, raw } => {
            let style = ListStyle::new(raw, conn.no_color);
            let jenkins = conn.connect()?;
            if style != ListStyle::Raw {
                println!("All jobs in {}", conn.host);
            }
            for job in jenkins.list_jobs()? {
                println!("{}", output::job_line(&job, style));
            }
            Ok(true)
        }
        Commands::Create {
            conn,
            jobname,
            template,
            vars,
            build,
            from_file,
            force,
            keep_disabled,
        } => {
            let vars: Variables = vars.into_iter().collect();
            println!("Creating job '{jobname}' from template '{template}' with:");
            for (name, value) in vars.iter() {
                println!("  {name}={value}");
            }

            let jenkins = conn.connect()?;
            let created = if from_file {
                jenkins.create(&jobname, &template, &vars)
            } else {
                jenkins.create_copy(&jobname, &template, !keep_disabled, force, &vars)
            };
            let triggered = created.and_then(|()| {
                if build {
                    println!("Triggering build.");
                    jenkins.build(&jobname, &Variables::new(), None)?;
                }
                Ok(())
            });
            match triggered {
                Ok(()) => {}
                Err(err) if is_reported(&err) => {
                    output::report(&err);
                    return Ok(false);
                }
                Err(err) => return Err(err.into()),
            }

            println!("Job URL: {}", jenkins.job_url(&jobname)?);
            Ok(true)
        }
        Commands::Build {
            conn,
            jobname,
            params,
            wait,
            timeout,
            grace,
            poll,
        } => {
            println!("Start building job '{jobname}'");
            let jenkins = conn.connect()?;
            let params: Variables = params.into_iter().collect();

            let wait_options = if wait {
                let token = CancellationToken::new();
                let on_interrupt = token.clone();
                ctrlc::set_handler(move || on_interrupt.cancel())?;

                let mut options = WaitOptions::default()
                    .grace(Duration::from_secs(grace))
                    .poll_interval(Duration::from_secs(poll))
                    .cancel_with(token);
                if let Some(secs) = timeout {
                    options = options.timeout(Duration::from_secs(secs));
                }
                Some(options)
            } else {
                None
            };

            match jenkins.build(&jobname, &params, wait_options.as_ref()) {
                Ok(BuildOutcome::Finished(build)) => {
                    let result = BuildResult::from_build(&build);
                    match &result {
                        Some(result) => println!("Result = \"{result}\""),
                        None => println!("Result = \"None\""),
                    }
                    Ok(result.is_some_and(|result| result.is_success()))
                }
                Ok(BuildOutcome::Queued(_)) => {
                    println!("Build '{jobname}' started");
                    Ok(true)
                }
                Err(err) if is_reported(&err) => {
                    output::report(&err);
                    Ok(false)
                }
                Err(err) => Err(err.into()),
            }
        }
        Commands::Delete { conn, jobnames } => {
            let jenkins = conn.connect()?;
            let mut all_deleted = true;
            for jobname in jobnames {
                println!("Deleting job '{jobname}'");
                match jenkins.delete(&jobname) {
                    Ok(()) => println!("Job '{jobname}' deleted"),
                    Err(err) if err.is_auth_error() => {
                        tracing::warn!(job = %jobname, error = %err, "skipping job");
                    }
                    Err(err) if is_reported(&err) => {
                        output::report(&err);
                        all_deleted = false;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Ok(all_deleted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_create_with_variables() {
        let args = Args::try_parse_from([
            "autojenkins",
            "create",
            "http://ci.local",
            "new-job",
            "template",
            "-D",
            "repo=git@example.com:x.git",
            "-Dbranch=main",
            "--force",
        ])
        .unwrap();
        let Commands::Create {
            conn, vars, force, ..
        } = args.commands
        else {
            panic!("expected create");
        };
        assert_eq!(conn.host, "http://ci.local");
        assert!(force);
        assert_eq!(
            vars,
            vec![
                ("repo".to_owned(), "git@example.com:x.git".to_owned()),
                ("branch".to_owned(), "main".to_owned()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_variable() {
        assert!(
            Args::try_parse_from(["autojenkins", "create", "h", "j", "t", "-D", "novalue"])
                .is_err()
        );
    }

    #[test]
    fn build_wait_defaults() {
        let args = Args::try_parse_from([
            "autojenkins",
            "build",
            "http://ci.local",
            "job",
            "--wait",
            "-P",
            "ENV=staging",
        ])
        .unwrap();
        let Commands::Build {
            wait,
            grace,
            poll,
            timeout,
            params,
            ..
        } = args.commands
        else {
            panic!("expected build");
        };
        assert!(wait);
        assert_eq!((grace, poll, timeout), (10, 3, None));
        assert_eq!(params, vec![("ENV".to_owned(), "staging".to_owned())]);
    }

    #[test]
    fn connection_maps_to_server_config() {
        let conn = Connection {
            host: "https://ci.local".to_owned(),
            user: Some("me".to_owned()),
            password: Some("token".to_owned()),
            proxy: Some("proxy:3128".to_owned()),
            insecure: true,
            no_color: false,
        };
        let config = conn.server_config();
        assert_eq!(config.base_url, "https://ci.local");
        assert_eq!(config.auth.unwrap().user, "me");
        assert_eq!(config.proxy, Some(ProxyConfig::both("proxy:3128")));
        assert_eq!(config.verify_tls, Some(false));
    }

    #[test]
    fn delete_needs_a_job() {
        assert!(Args::try_parse_from(["autojenkins", "delete", "http://ci.local"]).is_err());
    }
}
