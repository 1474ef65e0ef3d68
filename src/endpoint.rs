//! The closed set of server commands and the URLs they resolve to.

use crate::{
    BuildNumber, Error, JobName,
    transport::request::{Request, Target},
    util::url::{endpoint_url, normalize_base_url},
};
use http::Method;
use url::Url;

const API: [&str; 2] = ["api", "python"];

/// One server command with its positional arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// `GET /api/python`
    ListJobs,
    /// `GET /job/<name>/api/python`
    JobInfo(&'a JobName),
    /// `GET /job/<name>/<n|lastBuild>/api/python`
    BuildInfo(&'a JobName, BuildNumber),
    /// `GET /job/<name>/lastSuccessfulBuild/api/python`
    LastSuccessfulBuild(&'a JobName),
    /// `GET /job/<name>/lastBuild/testReport/api/python`
    TestReport(&'a JobName),
    /// `GET /job/<name>/<n|lastBuild>/consoleText`
    ConsoleText(&'a JobName, BuildNumber),
    /// `GET /job/<name>/config.xml`
    Config(&'a JobName),
    /// `POST /job/<name>/config.xml`
    UpdateConfig(&'a JobName),
    /// `POST /createItem?name=<name>`
    CreateItem(&'a JobName),
    /// `POST /createItem?name=<name>&mode=copy&from=<from>`
    CopyItem { name: &'a JobName, from: &'a JobName },
    /// `POST /job/<name>/build`
    Build(&'a JobName),
    /// `POST /job/<name>/buildWithParameters`
    BuildWithParameters(&'a JobName),
    /// `POST /job/<name>/doDelete`
    Delete(&'a JobName),
    /// `POST /job/<name>/enable`
    Enable(&'a JobName),
    /// `POST /job/<name>/disable`
    Disable(&'a JobName),
    /// `GET <address>api/python` for an address the server handed out.
    Absolute(&'a str),
}

fn job<'a>(name: &'a JobName, rest: &[&'a str]) -> Vec<String> {
    let mut segments = vec!["job".to_owned(), name.as_str().to_owned()];
    segments.extend(rest.iter().map(|s| (*s).to_owned()));
    segments
}

impl Command<'_> {
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::ListJobs
            | Self::JobInfo(_)
            | Self::BuildInfo(..)
            | Self::LastSuccessfulBuild(_)
            | Self::TestReport(_)
            | Self::ConsoleText(..)
            | Self::Config(_)
            | Self::Absolute(_) => Method::GET,
            Self::UpdateConfig(_)
            | Self::CreateItem(_)
            | Self::CopyItem { .. }
            | Self::Build(_)
            | Self::BuildWithParameters(_)
            | Self::Delete(_)
            | Self::Enable(_)
            | Self::Disable(_) => Method::POST,
        }
    }

    /// Path segments below the base URL, before percent-encoding.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        match *self {
            Self::ListJobs | Self::Absolute(_) => API.map(str::to_owned).to_vec(),
            Self::JobInfo(name) => job(name, &API),
            Self::BuildInfo(name, n) => {
                let mut segments = job(name, &[]);
                segments.push(n.segment());
                segments.extend(API.map(str::to_owned));
                segments
            }
            Self::LastSuccessfulBuild(name) => job(name, &["lastSuccessfulBuild", API[0], API[1]]),
            Self::TestReport(name) => job(name, &["lastBuild", "testReport", API[0], API[1]]),
            Self::ConsoleText(name, n) => {
                let mut segments = job(name, &[]);
                segments.push(n.segment());
                segments.push("consoleText".to_owned());
                segments
            }
            Self::Config(name) | Self::UpdateConfig(name) => job(name, &["config.xml"]),
            Self::CreateItem(_) | Self::CopyItem { .. } => vec!["createItem".to_owned()],
            Self::Build(name) => job(name, &["build"]),
            Self::BuildWithParameters(name) => job(name, &["buildWithParameters"]),
            Self::Delete(name) => job(name, &["doDelete"]),
            Self::Enable(name) => job(name, &["enable"]),
            Self::Disable(name) => job(name, &["disable"]),
        }
    }

    #[must_use]
    pub fn query(&self) -> Vec<(String, String)> {
        match *self {
            Self::CreateItem(name) => vec![("name".to_owned(), name.to_string())],
            Self::CopyItem { name, from } => vec![
                ("name".to_owned(), name.to_string()),
                ("mode".to_owned(), "copy".to_owned()),
                ("from".to_owned(), from.to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// Full URL of this command on the server at `base`.
    ///
    /// [`Command::Absolute`] ignores `base`.
    pub fn url(&self, base: &Url) -> Result<Url, Error> {
        let base = match self {
            Self::Absolute(address) => normalize_base_url(address)?,
            _ => base.clone(),
        };
        let mut url = endpoint_url(&base, self.segments().iter().map(String::as_str))?;
        let query = self.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Same as [`Command::url`], for a server other than the client's own.
    pub fn url_on(&self, remote: &str) -> Result<Url, Error> {
        self.url(&normalize_base_url(remote)?)
    }

    pub(crate) fn request(&self) -> Result<Request, Error> {
        let mut req = Request::new(self.method(), self.segments());
        if let Self::Absolute(address) = self {
            req = req.on(Target::Reported(normalize_base_url(address)?));
        }
        for (key, value) in self.query() {
            req = req.query_pair(key, value);
        }
        Ok(req)
    }

    pub(crate) fn request_on(&self, remote: &str) -> Result<Request, Error> {
        Ok(self
            .request()?
            .on(Target::Remote(normalize_base_url(remote)?)))
    }
}
