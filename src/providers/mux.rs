use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ProviderError, VideoAsset, VideoHost};

const MUX_API_URL: &str = "https://api.mux.com";

pub struct MuxClient{
    http: reqwest::Client,
    token_id: String,
    token_secret: String,
    base_url: String,
}

#[derive(Serialize)]
struct CreateAssetRequest<'a>{
    input: [AssetInput<'a>; 1],
    playback_policy: [&'a str; 1],
}

#[derive(Serialize)]
struct AssetInput<'a>{
    url: &'a str,
}

#[derive(Deserialize)]
struct AssetEnvelope{
    data: AssetData,
}

#[derive(Deserialize)]
struct AssetData{
    id: String,
    #[serde(default)]
    playback_ids: Vec<PlaybackId>,
}

#[derive(Deserialize)]
struct PlaybackId{
    id: String,
}

impl MuxClient {
    pub fn new(token_id:String, token_secret:String) -> Result<Self, ProviderError>{
        Self::with_base_url(token_id, token_secret, MUX_API_URL)
    }

    pub fn with_base_url(token_id:String, token_secret:String, base_url:&str) -> Result<Self, ProviderError>{
        let http = reqwest::Client::builder().build()?;
        Ok(Self{
            http,
            token_id,
            token_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn into_video_asset(envelope:AssetEnvelope) -> Result<VideoAsset, ProviderError>{
    let playback_id = envelope
        .data
        .playback_ids
        .into_iter()
        .next()
        .map(|playback| playback.id)
        .ok_or_else(|| ProviderError::UnexpectedResponse("no playback id received".into()))?;

    Ok(VideoAsset{asset_id: envelope.data.id, playback_id})
}

#[async_trait]
impl VideoHost for MuxClient {
    async fn create_asset(&self, input_url:&str) -> Result<VideoAsset, ProviderError>{
        let envelope = self
            .http
            .post(format!("{}/video/v1/assets", self.base_url))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .json(&CreateAssetRequest{
                input: [AssetInput{url: input_url}],
                playback_policy: ["public"],
            })
            .send()
            .await?
            .error_for_status()?
            .json::<AssetEnvelope>()
            .await?;

        let asset = into_video_asset(envelope)?;
        tracing::info!(asset_id = %asset.asset_id, "video asset created");
        Ok(asset)
    }

    async fn delete_asset(&self, asset_id:&str) -> Result<(), ProviderError>{
        let res = self
            .http
            .delete(format!("{}/video/v1/assets/{}", self.base_url, asset_id))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .send()
            .await?;

        // already gone on the host side
        if res.status() == StatusCode::NOT_FOUND {
            tracing::warn!(asset_id, "video asset missing on delete");
            return Ok(());
        }

        res.error_for_status()?;
        Ok(())
    }
}
