use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

pub fn markdown_key(resume_id: Uuid) -> String {
    format!("resumes/{resume_id}/cv.md")
}

/// Uploads rendered markdown, overwriting the previous snapshot. Returns the object key.
pub async fn upload_markdown(
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    resume_id: Uuid,
    markdown: &str,
) -> Result<String> {
    let s3_key = markdown_key(resume_id);
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(markdown.as_bytes().to_vec()))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded resume snapshot to s3://{}/{}", s3_bucket, s3_key);
    Ok(s3_key)
}
