use anyhow::{anyhow, Result};
use opendal::services::{Fs, Memory, S3};
use opendal::Operator;
use url::Url;

/// Builds an OpenDAL operator from a storage URI.
///
/// Supported schemes:
/// - `memory://` for tests
/// - `file:///path/to/dir` for the local filesystem
/// - `s3://bucket/prefix` (credentials come from the environment)
pub fn operator_from_uri(uri: &str) -> Result<Operator> {
    if uri == "memory://" {
        return Ok(Operator::new(Memory::default())?.finish());
    }

    let url = Url::parse(uri).map_err(|e| anyhow!("invalid storage URI '{}': {}", uri, e))?;
    match url.scheme() {
        "file" | "fs" => {
            let builder = Fs::default().root(url.path());
            Ok(Operator::new(builder)?.finish())
        }
        "s3" => {
            let bucket = url
                .host_str()
                .ok_or_else(|| anyhow!("s3 URI is missing a bucket"))?;
            let mut builder = S3::default().bucket(bucket).region("auto");
            let root = url.path();
            if !root.is_empty() && root != "/" {
                builder = builder.root(root);
            }
            Ok(Operator::new(builder)?.finish())
        }
        other => Err(anyhow!("unsupported storage scheme '{}'", other)),
    }
}
