//! Fetch markup fragments and place them in a [`Page`].
//!
//! A fragment location is either an `http://`/`https://` URL, fetched with
//! [`reqwest`], or a path read from disk (relative paths resolve against the
//! loader's base directory). Each load is a single attempt; failures are
//! logged and returned.
//!
//! ```rust,ignore
//! let loader = FragmentLoader::new().with_base_dir("site");
//! let cmd = loader.load_component_cmd(&page, "navbar", "partials/navbar.html", Msg::NavbarLoaded);
//! ```

use std::path::{Path, PathBuf};
use vitrine_core::{Command, Page};

/// Why a fragment could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported fragment location `{0}`")]
    InvalidUrl(String),
}

/// Where a location points.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Http(String),
    File(PathBuf),
}

/// Loads fragments over HTTP or from disk.
#[derive(Debug, Clone, Default)]
pub struct FragmentLoader {
    client: reqwest::Client,
    base_dir: Option<PathBuf>,
}

impl FragmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file locations against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn resolve(&self, location: &str) -> Result<Source, FragmentError> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(FragmentError::InvalidUrl(location.to_string()));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Source::Http(trimmed.to_string()));
        }
        if trimmed.contains("://") {
            return Err(FragmentError::InvalidUrl(location.to_string()));
        }
        let path = Path::new(trimmed);
        let path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        Ok(Source::File(path))
    }

    /// Fetch the raw text at `location`.
    pub async fn fetch(&self, location: &str) -> Result<String, FragmentError> {
        match self.resolve(location)? {
            Source::Http(url) => {
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                tracing::debug!(%url, %status, "fragment response");
                if !status.is_success() {
                    return Err(FragmentError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
            Source::File(path) => tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| FragmentError::Io { path, source }),
        }
    }

    /// Fetch `location`, parse it, and make the parsed elements the content
    /// of the element with id `target_id`. The raw text is returned even if
    /// the element is missing.
    pub async fn load_component(
        &self,
        page: &Page,
        target_id: &str,
        location: &str,
    ) -> Result<String, FragmentError> {
        let markup = self.fetch(location).await.inspect_err(|err| {
            tracing::error!(%err, location, "error loading fragment");
        })?;
        match page.find(target_id) {
            Some(target) => {
                if let Err(err) = page.set_inner_markup(target, &markup) {
                    tracing::warn!(%err, target_id, "could not inject fragment");
                }
            }
            None => tracing::warn!(target_id, location, "fragment target not found"),
        }
        Ok(markup)
    }

    /// Fetch `location` and append it to the page head.
    pub async fn load_head(&self, page: &Page, location: &str) -> Result<String, FragmentError> {
        let markup = self.fetch(location).await.inspect_err(|err| {
            tracing::error!(%err, location, "error loading head fragment");
        })?;
        page.append_head(markup.clone());
        Ok(markup)
    }

    /// [`load_component`](Self::load_component) as a command whose result
    /// is mapped into a message.
    pub fn load_component_cmd<Msg: Send + 'static>(
        &self,
        page: &Page,
        target_id: impl Into<String>,
        location: impl Into<String>,
        map: impl FnOnce(Result<String, FragmentError>) -> Msg + Send + 'static,
    ) -> Command<Msg> {
        let loader = self.clone();
        let page = page.clone();
        let target_id = target_id.into();
        let location = location.into();
        Command::perform(
            async move { loader.load_component(&page, &target_id, &location).await },
            map,
        )
    }

    /// [`load_head`](Self::load_head) as a command.
    pub fn load_head_cmd<Msg: Send + 'static>(
        &self,
        page: &Page,
        location: impl Into<String>,
        map: impl FnOnce(Result<String, FragmentError>) -> Msg + Send + 'static,
    ) -> Command<Msg> {
        let loader = self.clone();
        let page = page.clone();
        let location = location.into();
        Command::perform(async move { loader.load_head(&page, &location).await }, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navbar::{self, Navbar, NavbarOptions};
    use httpmock::prelude::*;
    use vitrine_core::testing::resolve_command;
    use vitrine_core::{Component, Element};

    fn page_with_slot(id: &str) -> (Page, vitrine_core::NodeKey) {
        let page = Page::new();
        let slot = page
            .append(page.body(), Element::new("div").with_id(id))
            .unwrap();
        (page, slot)
    }

    #[test]
    fn resolve_classifies_locations() {
        let loader = FragmentLoader::new().with_base_dir("/srv/site");
        assert_eq!(
            loader.resolve("https://example.com/nav.html").unwrap(),
            Source::Http("https://example.com/nav.html".into())
        );
        assert_eq!(
            loader.resolve("partials/nav.html").unwrap(),
            Source::File(PathBuf::from("/srv/site/partials/nav.html"))
        );
        assert!(matches!(
            loader.resolve("ftp://example.com/x"),
            Err(FragmentError::InvalidUrl(_))
        ));
        assert!(matches!(loader.resolve("  "), Err(FragmentError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn load_component_injects_markup() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/navbar.html");
            then.status(200).body("<nav class=\"navbar\"></nav>");
        });
        let (page, slot) = page_with_slot("navbar");
        page.append(slot, Element::new("p").with_text("loading"))
            .unwrap();

        let text = FragmentLoader::new()
            .load_component(&page, "navbar", &server.url("/navbar.html"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(text, "<nav class=\"navbar\"></nav>");
        let kids = page.children(slot);
        assert_eq!(kids.len(), 1);
        assert!(page.has_class(kids[0], "navbar"));
        assert_eq!(page.get(slot).unwrap().text(), "");
    }

    #[tokio::test]
    async fn navbar_attaches_to_loaded_markup() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/navbar.html");
            then.status(200).body(
                r#"<nav class="navbar">
                     <input type="checkbox" id="mobile-toggle">
                     <a href="/">Home</a>
                     <li class="dropdown-parent">
                       <a class="dropdown-toggle">Products</a>
                       <ul class="dropdown">
                         <li><a href="/carousel">Carousel</a></li>
                         <li><a href="/navbar">Navbar</a></li>
                       </ul>
                     </li>
                   </nav>"#,
            );
        });
        let (page, header) = page_with_slot("header");
        let mut nav = Navbar::new(&page, NavbarOptions::default());
        nav.update(navbar::Message::Ready);
        assert!(!nav.is_attached());

        FragmentLoader::new()
            .load_component(&page, "header", &server.url("/navbar.html"))
            .await
            .unwrap();
        assert_eq!(page.children(header).len(), 1);
        assert!(page.find(navbar::MOBILE_TOGGLE_ID).is_some());

        nav.update(navbar::Message::Ready);
        assert!(nav.is_attached());
        assert_eq!(nav.group_count(), 1);
    }

    #[tokio::test]
    async fn missing_target_still_returns_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/footer.html");
            then.status(200).body("<footer></footer>");
        });
        let page = Page::new();
        let text = FragmentLoader::new()
            .load_component(&page, "footer", &server.url("/footer.html"))
            .await
            .unwrap();
        assert_eq!(text, "<footer></footer>");
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone.html");
            then.status(404);
        });
        let (page, slot) = page_with_slot("slot");
        let err = FragmentLoader::new()
            .load_component(&page, "slot", &server.url("/gone.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::Status { status: 404, .. }));
        assert_eq!(page.get(slot).unwrap().text(), "");
    }

    #[tokio::test]
    async fn load_head_appends_in_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/meta.html");
            then.status(200).body("<meta charset=\"utf-8\">");
        });
        let page = Page::new();
        page.append_head("<title>Pricing</title>");
        FragmentLoader::new()
            .load_head(&page, &server.url("/meta.html"))
            .await
            .unwrap();
        assert_eq!(
            page.head(),
            vec!["<title>Pricing</title>".to_string(), "<meta charset=\"utf-8\">".to_string()]
        );
    }

    #[tokio::test]
    async fn reads_files_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("partials")).unwrap();
        std::fs::write(dir.path().join("partials/hero.html"), "<h1>Plans</h1>").unwrap();
        let (page, slot) = page_with_slot("hero");

        let loader = FragmentLoader::new().with_base_dir(dir.path());
        let text = loader
            .load_component(&page, "hero", "partials/hero.html")
            .await
            .unwrap();

        assert_eq!(text, "<h1>Plans</h1>");
        let heading = page.children(slot)[0];
        assert_eq!(page.get(heading).unwrap().tag(), "h1");
        assert_eq!(page.get(heading).unwrap().text(), "Plans");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FragmentLoader::new()
            .with_base_dir(dir.path())
            .load_head(&Page::new(), "absent.html")
            .await
            .unwrap_err();
        match err {
            FragmentError::Io { path, .. } => assert!(path.ends_with("absent.html")),
            other => panic!("expected an io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commands_deliver_results_as_messages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nav.html"), "<nav></nav>").unwrap();
        let (page, slot) = page_with_slot("nav");
        let loader = FragmentLoader::new().with_base_dir(dir.path());

        let cmd = loader.load_component_cmd(&page, "nav", "nav.html", |r| r.map(|t| t.len()).ok());
        assert!(cmd.is_async());
        assert_eq!(resolve_command(cmd).await, vec![Some(11)]);
        assert_eq!(page.get(page.children(slot)[0]).unwrap().tag(), "nav");

        let head = loader.load_head_cmd(&page, "nav.html", |r| r.is_ok());
        assert_eq!(resolve_command(head).await, vec![true]);
        assert_eq!(page.head(), vec!["<nav></nav>".to_string()]);

        let missing = loader.load_head_cmd(&page, "absent.html", |r| r.is_ok());
        assert_eq!(resolve_command(missing).await, vec![false]);
    }
}
