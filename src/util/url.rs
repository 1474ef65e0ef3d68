use crate::Error;
use url::Url;

/// Parse a server (or build) address and make sure its path ends with `/`,
/// so that segments land under any sub-path the server is mounted on.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw.trim()).map_err(|err| Error::InvalidConfig {
        message: format!("invalid server url '{raw}'").into_boxed_str(),
        source: Some(Box::new(err)),
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::invalid_config(format!(
            "server url '{raw}' must be hierarchical"
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::invalid_config(
            "server url must not include query or fragment",
        ));
    }

    let path = url.path();
    if path != "/" && !path.ends_with('/') {
        url.set_path(&format!("{path}/"));
    }
    Ok(url)
}

pub(crate) fn endpoint_url<'a, I>(base_url: &Url, segments: I) -> Result<Url, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::invalid_config("server url must be a hierarchical URL"))?;
        path.pop_if_empty();
        for seg in segments {
            path.push(seg);
        }
    }
    Ok(url)
}

pub(crate) fn sanitize_url_for_error(url: &Url) -> Url {
    let mut safe = url.clone();
    safe.set_query(None);
    safe.set_fragment(None);
    let _ = safe.set_username("");
    let _ = safe.set_password(None);
    safe
}
