use crate::{
    BuildNumber, Error, JobName, JobSummary, Jenkins, Variables,
    endpoint::Command,
    template,
    transport::request::RequestBody,
    util::url::endpoint_url,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use url::Url;

#[derive(Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobSummary>,
}

impl Jenkins {
    /// `GET /api/python`, jobs in server order.
    pub fn list_jobs(&self) -> Result<Vec<JobSummary>, Error> {
        let list: JobList = self.send_typed(Command::ListJobs.request()?)?;
        Ok(list.jobs)
    }

    /// Whether `name` appears in [`Jenkins::list_jobs`]. Never cached.
    pub fn job_exists(&self, name: impl Into<JobName>) -> Result<bool, Error> {
        let name = name.into();
        let found = self.list_jobs()?.iter().any(|job| job.name == name);
        #[cfg(feature = "tracing")]
        tracing::debug!(job = %name, found, "checked job existence");
        Ok(found)
    }

    /// `GET /job/<name>/api/python`
    pub fn job_info(&self, name: impl Into<JobName>) -> Result<Value, Error> {
        let name = name.into();
        self.send_literal(Command::JobInfo(&name).request()?)
    }

    /// `GET /job/<name>/<n|lastBuild>/api/python`
    pub fn build_info(
        &self,
        name: impl Into<JobName>,
        number: impl Into<BuildNumber>,
    ) -> Result<Value, Error> {
        let name = name.into();
        self.send_literal(Command::BuildInfo(&name, number.into()).request()?)
    }

    /// `GET /job/<name>/<n|lastBuild>/consoleText`
    pub fn build_console_text(
        &self,
        name: impl Into<JobName>,
        number: impl Into<BuildNumber>,
    ) -> Result<String, Error> {
        let name = name.into();
        self.send_text(Command::ConsoleText(&name, number.into()).request()?)
    }

    /// `GET /job/<name>/lastSuccessfulBuild/api/python`
    pub fn last_success(&self, name: impl Into<JobName>) -> Result<Value, Error> {
        let name = name.into();
        self.send_literal(Command::LastSuccessfulBuild(&name).request()?)
    }

    /// `GET /job/<name>/lastBuild/testReport/api/python`
    pub fn last_build_report(&self, name: impl Into<JobName>) -> Result<Value, Error> {
        let name = name.into();
        self.send_literal(Command::TestReport(&name).request()?)
    }

    /// Browser address of a job. No request is made.
    pub fn job_url(&self, name: impl Into<JobName>) -> Result<Url, Error> {
        let name = name.into();
        endpoint_url(self.base_url(), ["job", name.as_str(), ""])
    }

    /// `GET /job/<name>/config.xml`, verbatim.
    pub fn get_config(&self, name: impl Into<JobName>) -> Result<String, Error> {
        let name = name.into();
        self.send_text(Command::Config(&name).request()?)
    }

    /// `POST /job/<name>/config.xml`, replacing the whole document.
    pub fn set_config(
        &self,
        name: impl Into<JobName>,
        config: impl Into<String>,
    ) -> Result<(), Error> {
        let name = name.into();
        self.send_unit(
            Command::UpdateConfig(&name)
                .request()?
                .body(RequestBody::xml(config)),
        )
    }

    /// Create `name` from a local `config.xml` template.
    ///
    /// Fails with [`Error::JobAlreadyExists`] before reading the file when
    /// the job is already there.
    pub fn create(
        &self,
        name: impl Into<JobName>,
        template_file: impl AsRef<Path>,
        vars: &Variables,
    ) -> Result<(), Error> {
        let name = name.into();
        if self.job_exists(&name)? {
            return Err(Error::JobAlreadyExists {
                name: name.as_str().into(),
            });
        }

        let path = template_file.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = template::render(&text, vars)?;
        self.create_item(&name, config)
    }

    /// Create (or with `force`, overwrite) `name` from the configuration of
    /// the existing job `template_job`.
    ///
    /// Placeholders in the template configuration are rendered with `vars`;
    /// `enable` clears any `<disabled>true</disabled>` flag.
    pub fn create_copy(
        &self,
        name: impl Into<JobName>,
        template_job: impl Into<JobName>,
        enable: bool,
        force: bool,
        vars: &Variables,
    ) -> Result<(), Error> {
        let name = name.into();
        let template_job = template_job.into();

        let jobs = self.list_jobs()?;
        if !jobs.iter().any(|job| job.name == template_job) {
            return Err(Error::JobNotFound {
                name: template_job.as_str().into(),
            });
        }
        let exists = jobs.iter().any(|job| job.name == name);
        if exists && !force {
            return Err(Error::JobAlreadyExists {
                name: name.as_str().into(),
            });
        }

        let config = template::render_copy(&self.get_config(&template_job)?, vars, enable)?;
        #[cfg(feature = "tracing")]
        tracing::info!(job = %name, template = %template_job, overwrite = exists, "copying job");
        if exists {
            self.set_config(&name, config)
        } else {
            self.create_item(&name, config)
        }
    }

    /// Server-side copy of `from` into a new job `name`, without templating.
    pub fn copy(&self, name: impl Into<JobName>, from: impl Into<JobName>) -> Result<(), Error> {
        let name = name.into();
        let from = from.into();
        self.send_unit(
            Command::CopyItem {
                name: &name,
                from: &from,
            }
            .request()?,
        )
    }

    /// Copy the configuration of `name` to a job of the same name on the
    /// server at `remote_base_url`. The remote server is not checked first.
    pub fn transfer(&self, name: impl Into<JobName>, remote_base_url: &str) -> Result<(), Error> {
        let name = name.into();
        let config = self.get_config(&name)?;
        #[cfg(feature = "tracing")]
        tracing::info!(job = %name, remote = remote_base_url, "transferring job");
        self.send_unit(
            Command::CreateItem(&name)
                .request_on(remote_base_url)?
                .body(RequestBody::xml(config)),
        )
    }

    /// `POST /job/<name>/doDelete`, after checking the job exists.
    pub fn delete(&self, name: impl Into<JobName>) -> Result<(), Error> {
        let name = name.into();
        self.ensure_exists(&name)?;
        self.send_unit(Command::Delete(&name).request()?)
    }

    /// `POST /job/<name>/enable`
    pub fn enable(&self, name: impl Into<JobName>) -> Result<(), Error> {
        let name = name.into();
        self.send_unit(Command::Enable(&name).request()?)
    }

    /// `POST /job/<name>/disable`
    pub fn disable(&self, name: impl Into<JobName>) -> Result<(), Error> {
        let name = name.into();
        self.send_unit(Command::Disable(&name).request()?)
    }

    pub(crate) fn ensure_exists(&self, name: &JobName) -> Result<(), Error> {
        if self.job_exists(name)? {
            Ok(())
        } else {
            Err(Error::JobNotFound {
                name: name.as_str().into(),
            })
        }
    }

    fn create_item(&self, name: &JobName, config: String) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        tracing::info!(job = %name, "creating job");
        self.send_unit(
            Command::CreateItem(name)
                .request()?
                .body(RequestBody::xml(config)),
        )
    }
}
