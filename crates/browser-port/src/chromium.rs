//! Chromium backend over the DevTools protocol
//!
//! Queries are resolved in the page by one fixed script that receives the
//! serialized [`Query`] as data. Matches are tagged with a per-lookup token
//! so handles can be re-found later with a plain attribute selector.

use crate::{errors::*, port::*, query::*};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const HANDLE_ATTR: &str = "data-swag-handle";

const RESOLVE_SCRIPT: &str = r#"(query, tag, attr) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const matchText = (m, text) => {
    const t = norm(text);
    if ('Exact' in m) return t === norm(m.Exact);
    return t.toLowerCase().includes(norm(m.Contains).toLowerCase());
  };
  const isHidden = (el) => {
    const s = getComputedStyle(el);
    return s.display === 'none' || s.visibility === 'hidden' || el.closest('[hidden]') !== null;
  };
  const implicitRole = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'select') return 'combobox';
    if (tag === 'header') return 'banner';
    if (tag === 'nav') return 'navigation';
    if (tag === 'li') return 'listitem';
    if (tag === 'th') return 'columnheader';
    if (tag === 'textarea') return 'textbox';
    if (tag === 'input') {
      const type = (el.getAttribute('type') || 'text').toLowerCase();
      if (['submit', 'button', 'reset'].includes(type)) return 'button';
      if (['text', 'password', 'email', 'search', 'tel', 'url'].includes(type)) return 'textbox';
    }
    return null;
  };
  const accName = (el) => {
    const label = el.getAttribute('aria-label');
    if (label) return label;
    if (el.tagName === 'INPUT') {
      return ['submit', 'button', 'reset'].includes(el.type) ? el.value : (el.getAttribute('placeholder') || '');
    }
    return el.textContent || '';
  };
  const ownText = (el) => Array.from(el.childNodes)
    .filter((n) => n.nodeType === Node.TEXT_NODE)
    .map((n) => n.textContent)
    .join(' ');
  const all = () => Array.from(document.querySelectorAll('*'));
  const order = (els) => {
    const set = new Set(els);
    return all().filter((e) => set.has(e));
  };
  const run = (q) => {
    const kind = Object.keys(q)[0];
    const v = q[kind];
    switch (kind) {
      case 'Role':
        return all().filter((e) => implicitRole(e) === v.role && !isHidden(e) && (!v.name || matchText(v.name, accName(e))));
      case 'Text':
        return all().filter((e) => norm(ownText(e)) !== '' && matchText(v, ownText(e)));
      case 'Css':
        return Array.from(document.querySelectorAll(v));
      case 'Filter':
        return run(v.base).filter((e) => matchText(v.has_text, e.textContent));
      case 'Has': {
        const inner = run(v.inner);
        return run(v.base).filter((e) => inner.some((i) => i !== e && e.contains(i)));
      }
      case 'Within': {
        const scopes = run(v.scope);
        return run(v.inner).filter((e) => scopes.some((s) => s !== e && s.contains(e)));
      }
      case 'Closest':
        return order(run(v.base).map((e) => e.closest(v.selector)).filter(Boolean));
      case 'First':
        return run(v).slice(0, 1);
      case 'Single': {
        const found = run(v);
        if (found.length > 1) throw { ambiguous: found.length };
        return found;
      }
      case 'Or':
        return order([...run(v[0]), ...run(v[1])]);
      default:
        throw new Error('unsupported query kind ' + kind);
    }
  };
  let found;
  try {
    found = run(query);
  } catch (e) {
    if (e && typeof e.ambiguous === 'number') return { ids: [], ambiguous: e.ambiguous };
    throw e;
  }
  const ids = found.map((el, i) => {
    const id = tag + '-' + i;
    el.setAttribute(attr, id);
    return id;
  });
  return { ids, ambiguous: null };
}"#;

/// What [`RESOLVE_SCRIPT`] hands back.
#[derive(Debug, Deserialize)]
struct Resolved {
    ids: Vec<String>,
    ambiguous: Option<usize>,
}

const VISIBLE_SCRIPT: &str = r#"(selector) => {
  const el = document.querySelector(selector);
  if (!el) return null;
  const s = getComputedStyle(el);
  const r = el.getBoundingClientRect();
  return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0;
}"#;

const TEXT_SCRIPT: &str = r#"(selector) => {
  const el = document.querySelector(selector);
  return el ? el.textContent : null;
}"#;

const CLEAR_VALUE_SCRIPT: &str = r#"(selector) => {
  const el = document.querySelector(selector);
  if (!el) return false;
  el.value = '';
  el.dispatchEvent(new Event('input', { bubbles: true }));
  return true;
}"#;

const CLEAR_STORAGE_SCRIPT: &str = "(() => { localStorage.clear(); sessionStorage.clear(); return true; })()";

const AUDIT_SCRIPT: &str = r#"(() => ({
  imagesWithoutAlt: document.querySelectorAll('img:not([alt])').length,
  inputsWithoutLabels: document.querySelectorAll('input:not([aria-label]):not([aria-labelledby])').length,
}))()"#;

/// Launch options for [`ChromiumPort`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromiumConfig {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    pub request_timeout_ms: u64,
    pub launch_timeout_ms: u64,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            no_sandbox: false,
            request_timeout_ms: 30_000,
            launch_timeout_ms: 20_000,
        }
    }
}

impl ChromiumConfig {
    fn browser_config(&self) -> Result<BrowserConfig, PortError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .launch_timeout(Duration::from_millis(self.launch_timeout_ms));

        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.executable {
            if !path.exists() {
                return Err(PortError::new(PortErrorKind::Launch)
                    .with_hint(format!("chrome executable not found at {}", path.display())));
            }
            builder = builder.chrome_executable(path.clone());
        }
        builder = builder.args(vec![
            "--disable-background-networking",
            "--disable-default-apps",
            "--disable-dev-shm-usage",
            "--disable-extensions",
            "--disable-sync",
            "--no-first-run",
            "--no-default-browser-check",
            "--password-store=basic",
            "--use-mock-keychain",
        ]);

        builder.build().map_err(|err| {
            PortError::new(PortErrorKind::Launch).with_hint(format!("browser config error: {err}"))
        })
    }
}

/// A dedicated Chromium instance with one page.
pub struct ChromiumPort {
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    page: Page,
}

impl ChromiumPort {
    /// Launch a fresh browser and open a blank page.
    pub async fn launch(config: &ChromiumConfig) -> Result<Self, PortError> {
        let browser_config = config.browser_config()?;
        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|err| {
            PortError::new(PortErrorKind::Launch).with_hint(format!("failed to launch chromium: {err}"))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(target: "browser-port", %err, "cdp handler stopped");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| PortError::io(format!("failed to open page: {err}")))?;

        info!(headless = config.headless, "Chromium browsing context ready");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler,
            page,
        })
    }

    fn handle_selector(handle: &ElementHandle) -> String {
        format!("[{}=\"{}\"]", HANDLE_ATTR, handle.id)
    }

    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> Result<T, PortError> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .build()
            .map_err(|err| PortError::io(format!("evaluate params: {err}")))?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|err| PortError::io(err.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|err| PortError::io(format!("unexpected evaluation result: {err}")))
    }

    async fn call_with_selector<T: DeserializeOwned>(
        &self,
        script: &str,
        handle: &ElementHandle,
    ) -> Result<T, PortError> {
        let selector = serde_json::to_string(&Self::handle_selector(handle))
            .map_err(|err| PortError::io(err.to_string()))?;
        self.evaluate(format!("({})({})", script, selector)).await
    }
}

#[async_trait]
impl BrowserPort for ChromiumPort {
    async fn navigate(&self, url: &str) -> Result<(), PortError> {
        debug!(url, "navigate");
        self.page
            .goto(url)
            .await
            .map_err(|err| PortError::navigation(format!("{url}: {err}")))?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), PortError> {
        self.page
            .reload()
            .await
            .map_err(|err| PortError::navigation(format!("reload: {err}")))?;
        Ok(())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<ElementHandle>, PortError> {
        query.validate()?;
        let tag = Uuid::new_v4().simple().to_string();
        let query_json =
            serde_json::to_string(query).map_err(|err| PortError::invalid_query(err.to_string()))?;
        let tag_json = serde_json::to_string(&tag).map_err(|err| PortError::io(err.to_string()))?;
        let attr_json =
            serde_json::to_string(HANDLE_ATTR).map_err(|err| PortError::io(err.to_string()))?;
        let resolved: Resolved = self
            .evaluate(format!(
                "({})({}, {}, {})",
                RESOLVE_SCRIPT, query_json, tag_json, attr_json
            ))
            .await?;
        if let Some(count) = resolved.ambiguous {
            debug!(query = %query, count, "single-element scope is ambiguous");
            return Err(PortError::ambiguous(count, query.to_string()));
        }
        debug!(query = %query, matches = resolved.ids.len(), "resolved query");
        Ok(resolved
            .ids
            .into_iter()
            .map(|id| ElementHandle::new(id, query))
            .collect())
    }

    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool, PortError> {
        let visible: Option<bool> = self.call_with_selector(VISIBLE_SCRIPT, handle).await?;
        visible.ok_or_else(|| PortError::detached(handle.to_string()))
    }

    async fn text_content(&self, handle: &ElementHandle) -> Result<Option<String>, PortError> {
        self.call_with_selector(TEXT_SCRIPT, handle).await
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), PortError> {
        let element = self
            .page
            .find_element(Self::handle_selector(handle))
            .await
            .map_err(|err| PortError::detached(format!("{handle}: {err}")))?;
        element
            .click()
            .await
            .map_err(|err| PortError::not_interactable(format!("{handle}: {err}")))?;
        Ok(())
    }

    async fn fill(&self, handle: &ElementHandle, text: &str) -> Result<(), PortError> {
        let cleared: bool = self.call_with_selector(CLEAR_VALUE_SCRIPT, handle).await?;
        if !cleared {
            return Err(PortError::detached(handle.to_string()));
        }
        let element = self
            .page
            .find_element(Self::handle_selector(handle))
            .await
            .map_err(|err| PortError::detached(format!("{handle}: {err}")))?;
        element
            .click()
            .await
            .map_err(|err| PortError::not_interactable(format!("{handle}: {err}")))?;
        element
            .type_str(text)
            .await
            .map_err(|err| PortError::not_interactable(format!("{handle}: {err}")))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PortError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| PortError::io(err.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn clear_storage(&self) -> Result<(), PortError> {
        let _: bool = self.evaluate(CLEAR_STORAGE_SCRIPT.to_string()).await?;
        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|err| PortError::io(format!("clear cookies: {err}")))?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, PortError> {
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|err| PortError::io(format!("screenshot: {err}")))
    }

    async fn accessibility_audit(&self) -> Result<AccessibilityAudit, PortError> {
        self.evaluate(AUDIT_SCRIPT.to_string()).await
    }

    async fn close(&self) -> Result<(), PortError> {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            if let Err(err) = browser.close().await {
                warn!(%err, "browser close failed");
            }
            let _ = browser.wait().await;
        }
        self.handler.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_headless() {
        let cfg = ChromiumConfig::default();
        assert!(cfg.headless);
        assert_eq!(cfg.request_timeout_ms, 30_000);
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let cfg = ChromiumConfig {
            executable: Some(PathBuf::from("/definitely/not/chrome")),
            ..ChromiumConfig::default()
        };
        let err = cfg.browser_config().unwrap_err();
        assert_eq!(err.kind, PortErrorKind::Launch);
    }

    #[test]
    fn handle_selector_uses_tag_attribute() {
        let handle = ElementHandle::new("abc-0", &Query::css("button"));
        assert_eq!(
            ChromiumPort::handle_selector(&handle),
            "[data-swag-handle=\"abc-0\"]"
        );
    }
}
