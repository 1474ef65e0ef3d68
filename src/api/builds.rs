use crate::{
    BuildOutcome, Error, JobName, Jenkins, QueueItemId, TriggeredBuild, Variables, WaitOptions,
    endpoint::Command,
    transport::request::Response,
};
use serde_json::Value;
use std::time::{Duration, Instant};

fn parse_queue_item_id_from_location(location: &str) -> Option<QueueItemId> {
    let segments: Vec<&str> = location.split('/').filter(|s| !s.is_empty()).collect();
    let item_pos = segments.iter().position(|s| *s == "item")?;
    let id = segments.get(item_pos + 1)?;
    Some(QueueItemId::new(*id))
}

fn triggered_build_from_response(resp: &Response) -> TriggeredBuild {
    let location = resp
        .header_str(http::header::LOCATION)
        .map(|s| s.to_owned().into_boxed_str());
    let queue_item_id = location
        .as_deref()
        .and_then(parse_queue_item_id_from_location);
    TriggeredBuild {
        status: resp.status,
        queue_item_id,
        location,
    }
}

/// `Some(false)` only when the build reports it has finished.
fn building_flag(build: &Value) -> Option<bool> {
    build.get("building").and_then(Value::as_bool)
}

impl Jenkins {
    /// Trigger a build of `name`, optionally blocking until it finishes.
    ///
    /// Non-empty `params` go to `buildWithParameters` as form fields. With
    /// `wait`, the call sleeps for the grace period and then polls
    /// [`Jenkins::last_result`] until the build stops building.
    pub fn build(
        &self,
        name: impl Into<JobName>,
        params: &Variables,
        wait: Option<&WaitOptions>,
    ) -> Result<BuildOutcome, Error> {
        let name = name.into();
        self.ensure_exists(&name)?;

        let info = self.job_info(&name)?;
        let buildable = info
            .get("buildable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        #[cfg(feature = "tracing")]
        tracing::debug!(job = %name, buildable, "checked job is buildable");
        if !buildable {
            return Err(Error::JobNotBuildable {
                name: name.as_str().into(),
            });
        }

        let req = if params.is_empty() {
            Command::Build(&name).request()?
        } else {
            Command::BuildWithParameters(&name)
                .request()?
                .form_pairs(params.iter())
        };
        let triggered = triggered_build_from_response(&self.send_response(req)?);
        #[cfg(feature = "tracing")]
        tracing::info!(
            job = %name,
            queue_item = triggered.queue_item_id.as_ref().map(QueueItemId::as_str),
            "build triggered"
        );

        match wait {
            None => Ok(BuildOutcome::Queued(triggered)),
            Some(wait) => self
                .poll_until_finished(&name, wait, wait.grace)
                .map(BuildOutcome::Finished),
        }
    }

    /// Poll an already triggered build of `name` until it finishes.
    ///
    /// Starts polling immediately; [`WaitOptions::grace`] is not applied.
    pub fn wait_for_build(
        &self,
        name: impl Into<JobName>,
        wait: &WaitOptions,
    ) -> Result<Value, Error> {
        let name = name.into();
        self.poll_until_finished(&name, wait, Duration::ZERO)
    }

    /// Attributes of the most recent build, fetched through the address the
    /// server reports for it in `lastBuild.url`.
    pub fn last_result(&self, name: impl Into<JobName>) -> Result<Value, Error> {
        let name = name.into();
        let info = self.job_info(&name)?;
        let Some(url) = info
            .get("lastBuild")
            .and_then(|build| build.get("url"))
            .and_then(Value::as_str)
        else {
            return Err(Error::NoBuilds {
                name: name.as_str().into(),
            });
        };
        self.send_literal(Command::Absolute(url).request()?)
    }

    /// Whether the most recent build is still running.
    ///
    /// A job without builds, or a build without a boolean `building` field,
    /// counts as building.
    pub fn is_building(&self, name: impl Into<JobName>) -> Result<bool, Error> {
        match self.last_result(name) {
            Ok(build) => Ok(building_flag(&build).unwrap_or(true)),
            Err(Error::NoBuilds { .. }) => Ok(true),
            Err(err) => Err(err),
        }
    }

    fn poll_until_finished(
        &self,
        name: &JobName,
        wait: &WaitOptions,
        grace: Duration,
    ) -> Result<Value, Error> {
        let started = Instant::now();
        let deadline = wait.timeout.map(|timeout| started + timeout);
        wait.pause(grace, deadline);

        loop {
            if wait.is_cancelled() {
                return Err(Error::Cancelled {
                    name: name.as_str().into(),
                });
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(Error::BuildTimeout {
                    name: name.as_str().into(),
                    elapsed: started.elapsed(),
                });
            }

            let build = match self.last_result(name) {
                Ok(build) => Some(build),
                Err(Error::NoBuilds { .. }) => None,
                Err(err) => return Err(err),
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(
                job = %name,
                building = build.as_ref().and_then(building_flag),
                "polled build"
            );

            if let Some(build) = build.filter(|build| building_flag(build) == Some(false)) {
                #[cfg(any(feature = "tracing", feature = "metrics"))]
                let result = crate::BuildResult::from_build(&build)
                    .map_or_else(|| "UNKNOWN".to_owned(), |result| result.to_string());
                #[cfg(feature = "tracing")]
                tracing::info!(job = %name, result = %result, "build finished");
                #[cfg(feature = "metrics")]
                crate::transport::metrics::record_build_finished(&result, started.elapsed());
                return Ok(build);
            }

            wait.pause(wait.poll_interval, deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_item_from_location() {
        assert_eq!(
            parse_queue_item_id_from_location("http://ci.local/queue/item/42/"),
            Some(QueueItemId::new("42"))
        );
        assert_eq!(parse_queue_item_id_from_location("http://ci.local/job/x/"), None);
    }

    #[test]
    fn only_explicit_false_means_finished() {
        assert_eq!(building_flag(&serde_json::json!({"building": false})), Some(false));
        assert_eq!(building_flag(&serde_json::json!({"building": true})), Some(true));
        assert_eq!(building_flag(&serde_json::json!({"building": null})), None);
        assert_eq!(building_flag(&serde_json::json!({})), None);
    }
}
