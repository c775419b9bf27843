// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment helpers: photo size selection and download URLs.

use teloxide::types::PhotoSize;

/// Picks the largest photo variant by pixel area. Telegram lists sizes
/// smallest first, so ties go to the later entry.
pub fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

/// Download URL for a file path returned by `getFile`.
///
/// The URL embeds the bot token, so it must never be logged.
pub fn file_download_url(api_url: &str, token: &str, file_path: &str) -> String {
    format!(
        "{}/file/bot{token}/{}",
        api_url.trim_end_matches('/'),
        file_path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, side: u32) -> PhotoSize {
        serde_json::from_value(serde_json::json!({
            "file_id": id,
            "file_unique_id": format!("u-{id}"),
            "width": side,
            "height": side,
        }))
        .unwrap()
    }

    #[test]
    fn largest_photo_by_area() {
        let photos = vec![photo("a", 90), photo("b", 1280), photo("c", 320)];
        assert_eq!(largest_photo(&photos).unwrap().file.id.0, "b");
    }

    #[test]
    fn largest_photo_ties_and_empty() {
        let photos = vec![photo("a", 320), photo("b", 320)];
        assert_eq!(largest_photo(&photos).unwrap().file.id.0, "b");
        assert!(largest_photo(&[]).is_none());
    }

    #[test]
    fn download_url_shape() {
        assert_eq!(
            file_download_url("https://api.telegram.org/", "123:abc", "photos/file_1.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_1.jpg"
        );
    }
}
