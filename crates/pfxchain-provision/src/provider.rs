//! Turns a configured PFX file into a cached PEM bundle.

use crate::bundle::Bundle;
use crate::cache_key::cache_key;
use crate::config::PfxConfig;
use crate::credential::Credential;
use crate::storage::BlobStore;
use pfxchain_client::IssuerFetcher;
use pfxchain_core::{ChainError, Result};
use pfxchain_resolver::{ChainResolver, ResolveOptions};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Certificate source backed by one PKCS#12 file.
///
/// The bundle is generated at most once per cache key; concurrent callers
/// wait for the first generation and then read the stored result.
pub struct PfxProvider<S, F> {
    config: PfxConfig,
    storage: S,
    fetcher: F,
    options: ResolveOptions,
    cache_key: String,
    generating: Mutex<()>,
}

impl<S: BlobStore, F: IssuerFetcher> PfxProvider<S, F> {
    /// Validate `config` and derive the cache key from the file's mtime.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid or the file cannot be stat'ed.
    pub async fn provision(config: PfxConfig, storage: S, fetcher: F) -> Result<Self> {
        config.validate()?;

        let modified = tokio::fs::metadata(&config.path)
            .await
            .and_then(|meta| meta.modified())
            .map_err(|e| ChainError::io(&config.path, e))?;
        let key = cache_key(&config.path, modified, config.fetch_full_chain());

        info!(
            path = %config.path.display(),
            cache_key = %key,
            fetch_full_chain = config.fetch_full_chain(),
            "provisioned PFX certificate source"
        );

        Ok(Self {
            config,
            storage,
            fetcher,
            options: ResolveOptions::default(),
            cache_key: key,
            generating: Mutex::new(()),
        })
    }

    /// Bounds for issuer downloads during generation
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Key under which the bundle is stored
    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Settings this provider was created with
    #[must_use]
    pub const fn config(&self) -> &PfxConfig {
        &self.config
    }

    /// Load the bundle, generating it first if absent.
    ///
    /// A freshly generated bundle is stored only when chain resolution ran
    /// to completion; one cut short by a bound in [`ResolveOptions`] is
    /// returned but not cached, so a later call retries the download.
    pub async fn get_certificate(&self) -> Result<Bundle> {
        if self.storage.exists(&self.cache_key).await? {
            return self.load().await;
        }

        let _guard = self.generating.lock().await;
        if self.storage.exists(&self.cache_key).await? {
            return self.load().await;
        }

        match self.generate().await {
            Ok(bundle) => Ok(bundle),
            Err(e) => {
                error!(
                    path = %self.config.path.display(),
                    error = %e,
                    "failed to generate certificate bundle"
                );
                Err(e)
            }
        }
    }

    async fn load(&self) -> Result<Bundle> {
        let data = self.storage.load(&self.cache_key).await?;
        Bundle::decode(&data)
    }

    async fn generate(&self) -> Result<Bundle> {
        let path = &self.config.path;
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ChainError::io(path, e))?;
        let credential = Credential::from_pkcs12(&data, &self.config.password)?;

        let (chain, stopped) = if self.config.fetch_full_chain() {
            let resolved = ChainResolver::with_options(&self.fetcher, self.options.clone())
                .resolve(credential.initial_chain())
                .await?;
            debug!(
                fetched = resolved.fetched().len(),
                attempts = resolved.attempts(),
                complete = resolved.is_complete(),
                "resolved chain for bundle"
            );
            let stopped = resolved.stopped();
            (resolved.into_certificates(), stopped)
        } else {
            (credential.initial_chain(), None)
        };

        let bundle = Bundle::new(credential.private_key().to_vec(), &chain);

        if let Some(reason) = stopped {
            warn!(
                cache_key = %self.cache_key,
                reason = %reason,
                certificates = chain.len(),
                "chain resolution stopped early; bundle not cached"
            );
            return Ok(bundle);
        }

        self.storage.store(&self.cache_key, &bundle.encode()).await?;
        info!(
            cache_key = %self.cache_key,
            certificates = chain.len(),
            "stored certificate bundle"
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use async_trait::async_trait;
    use pfxchain_core::{parse_fetched, Certificate, KeyId};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex as StdMutex};
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    const LEAF_PFX: &[u8] = include_bytes!("../../../testdata/leaf.pfx");
    const LEAF_ONLY_PFX: &[u8] = include_bytes!("../../../testdata/leaf-only.pfx");
    const INT_PEM: &[u8] = include_bytes!("../../../testdata/int.pem");
    const ROOT_DER: &[u8] = include_bytes!("../../../testdata/root.der");

    const INT_URL: &str = "http://ca.example/int.pem";
    const ROOT_URL: &str = "http://ca.example/root.pem";

    #[derive(Default)]
    struct FixtureCa {
        calls: StdMutex<Vec<String>>,
    }

    impl FixtureCa {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IssuerFetcher for FixtureCa {
        async fn fetch(&self, url: &str) -> Result<Certificate> {
            self.calls.lock().unwrap().push(url.to_string());
            match url {
                INT_URL => parse_fetched(INT_PEM),
                ROOT_URL => parse_fetched(ROOT_DER),
                _ => Err(ChainError::Http(format!("connection refused: {url}"))),
            }
        }
    }

    fn write_pfx(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn skis(bundle: &Bundle) -> Vec<KeyId> {
        bundle
            .parse_certificates()
            .unwrap()
            .iter()
            .map(|c| c.subject_key_id().clone())
            .collect()
    }

    #[tokio::test]
    async fn full_chain_bundle_fetches_only_the_root() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_PFX);
        let fetcher = FixtureCa::default();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            MemoryStorage::new(),
            &fetcher,
        )
        .await
        .unwrap();
        assert!(provider.cache_key().ends_with("-fullchain+pkey.pem"));

        let bundle = provider.get_certificate().await.unwrap();
        assert_eq!(
            skis(&bundle),
            vec![KeyId::from("L"), KeyId::from("I"), KeyId::from("R")]
        );
        assert_eq!(fetcher.calls(), vec![ROOT_URL]);
    }

    #[tokio::test]
    async fn leaf_only_container_fetches_both_issuers() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_ONLY_PFX);
        let fetcher = FixtureCa::default();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            MemoryStorage::new(),
            &fetcher,
        )
        .await
        .unwrap();

        let bundle = provider.get_certificate().await.unwrap();
        assert_eq!(bundle.certificates().len(), 3);
        assert_eq!(fetcher.calls(), vec![INT_URL, ROOT_URL]);
    }

    #[tokio::test]
    async fn without_full_chain_the_container_chain_is_kept_as_is() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_PFX);
        let fetcher = FixtureCa::default();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("secret").with_full_chain(false),
            MemoryStorage::new(),
            &fetcher,
        )
        .await
        .unwrap();
        assert!(provider.cache_key().ends_with("-chain+pkey.pem"));

        let bundle = provider.get_certificate().await.unwrap();
        assert_eq!(skis(&bundle), vec![KeyId::from("L"), KeyId::from("I")]);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn second_call_is_served_from_storage() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_PFX);
        let cache = TempDir::new().unwrap();
        let fetcher = FixtureCa::default();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            FileStorage::new(cache.path()),
            &fetcher,
        )
        .await
        .unwrap();

        let first = provider.get_certificate().await.unwrap();
        let second = provider.get_certificate().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fetcher.calls().len(), 1);

        let stored = FileStorage::new(cache.path()).path_for(provider.cache_key());
        assert!(stored.is_file());
    }

    #[tokio::test]
    async fn concurrent_callers_generate_once() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_ONLY_PFX);
        let fetcher = Arc::new(FixtureCa::default());

        let provider = Arc::new(
            PfxProvider::provision(
                PfxConfig::new(&path).password("secret"),
                MemoryStorage::new(),
                Arc::clone(&fetcher),
            )
            .await
            .unwrap(),
        );

        let (a, b) = tokio::join!(provider.get_certificate(), provider.get_certificate());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn chain_cut_short_is_returned_but_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_ONLY_PFX);
        let storage = Arc::new(MemoryStorage::new());
        let fetcher = FixtureCa::default();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let interrupted = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            Arc::clone(&storage),
            &fetcher,
        )
        .await
        .unwrap()
        .with_options(ResolveOptions::default().cancel_on(cancel));

        let partial = interrupted.get_certificate().await.unwrap();
        assert_eq!(partial.certificates().len(), 1);
        assert!(storage.is_empty().await);

        let retry = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            Arc::clone(&storage),
            &fetcher,
        )
        .await
        .unwrap();
        assert_eq!(retry.cache_key(), interrupted.cache_key());

        let full = retry.get_certificate().await.unwrap();
        assert_eq!(full.certificates().len(), 3);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn fetch_ceiling_also_skips_the_cache() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_ONLY_PFX);
        let fetcher = FixtureCa::default();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("secret"),
            MemoryStorage::new(),
            &fetcher,
        )
        .await
        .unwrap()
        .with_options(ResolveOptions::default().max_fetches(1));

        let bundle = provider.get_certificate().await.unwrap();
        assert_eq!(bundle.certificates().len(), 2);
        assert!(provider.storage.is_empty().await);
    }

    #[tokio::test]
    async fn missing_file_fails_at_provision() {
        let dir = TempDir::new().unwrap();
        let result = PfxProvider::provision(
            PfxConfig::new(dir.path().join("absent.pfx")),
            MemoryStorage::new(),
            FixtureCa::default(),
        )
        .await;
        assert!(matches!(result, Err(ChainError::Io { .. })));
    }

    #[tokio::test]
    async fn empty_path_is_rejected() {
        let result =
            PfxProvider::provision(PfxConfig::default(), MemoryStorage::new(), FixtureCa::default())
                .await;
        assert!(matches!(result, Err(ChainError::Config(_))));
    }

    #[tokio::test]
    async fn wrong_password_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_pfx(&dir, "site.pfx", LEAF_PFX);
        let storage = MemoryStorage::new();

        let provider = PfxProvider::provision(
            PfxConfig::new(&path).password("wrong"),
            storage,
            FixtureCa::default(),
        )
        .await
        .unwrap();

        let err = provider.get_certificate().await.unwrap_err();
        assert!(matches!(err, ChainError::Pkcs12(_)));
        assert!(provider.storage.is_empty().await);
    }
}
