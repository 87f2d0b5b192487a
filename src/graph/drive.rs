use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::GraphClient;
use super::encode_path_segments;
use super::error::GraphError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UploadFileArgs {
    pub user_id: String,
    /// Target folder; "root" or an empty string addresses the drive root
    pub folder_path: String,
    pub file_name: String,
    pub file_content: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ListFolderArgs {
    pub user_id: String,
    #[serde(default = "default_folder_path")]
    pub folder_path: String,
}

fn default_folder_path() -> String {
    "root".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DownloadFileArgs {
    pub user_id: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeleteFileArgs {
    pub user_id: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DriveEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub size: Option<u64>,
    pub last_modified_date_time: Option<String>,
}

impl DriveEntry {
    fn from_graph(item: &Value) -> Self {
        Self {
            id: item.get("id").and_then(|v| v.as_str()).map(String::from),
            name: item.get("name").and_then(|v| v.as_str()).map(String::from),
            entry_type: if item.get("folder").is_some() {
                "folder".to_string()
            } else {
                "file".to_string()
            },
            size: item.get("size").and_then(|v| v.as_u64()),
            last_modified_date_time: item
                .get("lastModifiedDateTime")
                .and_then(|v| v.as_str())
                .map(String::from),
        }
    }
}

fn is_root(folder_path: &str) -> bool {
    folder_path.is_empty() || folder_path.eq_ignore_ascii_case("root")
}

/// Upload a text file into a OneDrive folder, creating the folder if needed
pub async fn upload_file(
    client: &GraphClient,
    args: &UploadFileArgs,
) -> Result<UploadedFile, GraphError> {
    let operation = format!("Failed to upload file '{}'", args.file_name);
    let token = client.token(&operation).await?;

    let encoded_name = encode_path_segments(&args.file_name);
    let url = if is_root(&args.folder_path) {
        format!(
            "{}/users/{}/drive/root/children/{}/content",
            client.base_url(),
            args.user_id,
            encoded_name
        )
    } else {
        format!(
            "{}/users/{}/drive/root:/{}/{}:/content",
            client.base_url(),
            args.user_id,
            encode_path_segments(&args.folder_path),
            encoded_name
        )
    };

    let response = client
        .execute(
            &operation,
            client
                .http()
                .put(&url)
                .bearer_auth(token)
                .header("Content-Type", "text/plain")
                .body(args.file_content.clone()),
        )
        .await?;

    let file_data: Value = response
        .json()
        .await
        .map_err(|e| GraphError::transport(&operation, &e))?;

    Ok(UploadedFile {
        id: file_data.get("id").and_then(|v| v.as_str()).map(String::from),
        name: file_data
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

/// List the immediate children of a OneDrive folder
pub async fn list_folder(
    client: &GraphClient,
    args: &ListFolderArgs,
) -> Result<Vec<DriveEntry>, GraphError> {
    let operation = format!("Failed to list files in '{}'", args.folder_path);
    let token = client.token(&operation).await?;

    let url = if is_root(&args.folder_path) {
        format!(
            "{}/users/{}/drive/root/children",
            client.base_url(),
            args.user_id
        )
    } else {
        format!(
            "{}/users/{}/drive/root:/{}:/children",
            client.base_url(),
            args.user_id,
            encode_path_segments(&args.folder_path)
        )
    };

    let response = client
        .execute(&operation, client.http().get(&url).bearer_auth(token))
        .await?;
    let data: Value = response
        .json()
        .await
        .map_err(|e| GraphError::transport(&operation, &e))?;

    let mut entries = Vec::new();
    if let Some(items) = data.get("value").and_then(|v| v.as_array()) {
        for item in items {
            entries.push(DriveEntry::from_graph(item));
        }
    }
    Ok(entries)
}

/// Download a file's content, addressed by item id or by path.
/// Fails before any network call when neither identifier is given.
pub async fn download_file(
    client: &GraphClient,
    args: &DownloadFileArgs,
) -> Result<Vec<u8>, GraphError> {
    let operation = "Failed to download file";

    let url = if let Some(file_id) = &args.file_id {
        format!(
            "{}/users/{}/drive/items/{}/content",
            client.base_url(),
            args.user_id,
            file_id
        )
    } else if let Some(file_path) = &args.file_path {
        format!(
            "{}/users/{}/drive/root:/{}:/content",
            client.base_url(),
            args.user_id,
            encode_path_segments(file_path)
        )
    } else {
        return Err(GraphError::MissingIdentifier(
            "Either file_id or file_path must be provided for download.".to_string(),
        ));
    };

    let token = client.token(operation).await?;
    let response = client
        .execute(operation, client.http().get(&url).bearer_auth(token))
        .await?;
    let content = response
        .bytes()
        .await
        .map_err(|e| GraphError::transport(operation, &e))?;

    Ok(content.to_vec())
}

/// Delete a file or folder, addressed by item id or by path.
/// Fails before any network call when neither identifier is given.
pub async fn delete_file(client: &GraphClient, args: &DeleteFileArgs) -> Result<(), GraphError> {
    let operation = "Failed to delete file";

    let url = if let Some(file_id) = &args.file_id {
        format!(
            "{}/users/{}/drive/items/{}",
            client.base_url(),
            args.user_id,
            file_id
        )
    } else if let Some(file_path) = &args.file_path {
        format!(
            "{}/users/{}/drive/root:/{}",
            client.base_url(),
            args.user_id,
            encode_path_segments(file_path)
        )
    } else {
        return Err(GraphError::MissingIdentifier(
            "Either file_id or file_path must be provided for deletion.".to_string(),
        ));
    };

    let token = client.token(operation).await?;
    client
        .execute(operation, client.http().delete(&url).bearer_auth(token))
        .await?;

    Ok(())
}
