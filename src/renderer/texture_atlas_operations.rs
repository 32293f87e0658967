//! Texture Atlas Operations - Pure DOP Functions
//!
//! Cuts a horizontal strip image into equal square tiles. Tile `i` is the
//! pixel-exact square `[i * height, 0, height, height]` of the strip.

use super::texture_atlas_data::{
    AtlasSlices, AtlasTextureData, AtlasTextureStore, ColorSpace, TextureId,
};
use crate::assets::{poll_load, spawn_load, AssetSource, AssetState, LoadStatus};
use crate::error::{OptionExt, ViewerError, ViewerResult};
use image::{imageops, RgbaImage};
use std::sync::Arc;

/// Blank texture usable before the atlas arrives
pub fn create_placeholder(tile_index: u32) -> AtlasTextureData {
    AtlasTextureData {
        tile_index,
        size: 0,
        color_space: ColorSpace::Linear,
        dirty: false,
        pixels: None,
    }
}

/// Append `tile_count` placeholders and return their ids in tile order
pub fn register_placeholders(store: &mut AtlasTextureStore, tile_count: u32) -> Vec<TextureId> {
    (0..tile_count)
        .map(|tile_index| {
            store.textures.push(create_placeholder(tile_index));
            store.textures.len() - 1
        })
        .collect()
}

/// Split a strip into `tile_count` square tiles, left to right
pub fn slice_tiles(strip: &RgbaImage, tile_count: u32) -> ViewerResult<Vec<RgbaImage>> {
    let (width, height) = strip.dimensions();
    validate_strip(width, height, tile_count)?;

    let tile_size = height;
    if width > tile_count * tile_size {
        log::warn!(
            "[texture_atlas_operations::slice_tiles] Strip is {}px wide, {} tiles use {}px; ignoring the rest",
            width,
            tile_count,
            tile_count * tile_size
        );
    }

    Ok((0..tile_count)
        .map(|i| imageops::crop_imm(strip, i * tile_size, 0, tile_size, tile_size).to_image())
        .collect())
}

fn validate_strip(width: u32, height: u32, tile_count: u32) -> ViewerResult<()> {
    let malformed = |reason: &str| ViewerError::MalformedAtlas {
        width,
        height,
        tile_count,
        reason: reason.to_string(),
    };

    if tile_count == 0 {
        return Err(malformed("tile count must be at least 1"));
    }
    if height == 0 {
        return Err(malformed("strip has no rows"));
    }
    match tile_count.checked_mul(height) {
        Some(needed) if needed <= width => Ok(()),
        _ => Err(malformed("strip narrower than tile_count * height")),
    }
}

/// Decode an encoded strip image and slice it
pub fn decode_atlas(path: &str, bytes: &[u8], tile_count: u32) -> ViewerResult<Vec<RgbaImage>> {
    let strip = image::load_from_memory(bytes)
        .map_err(|e| ViewerError::ImageDecode {
            path: path.to_string(),
            error: e.to_string(),
        })?
        .to_rgba8();

    slice_tiles(&strip, tile_count)
}

/// Register placeholders and start loading the strip at `url`.
///
/// The returned ids can be bound to materials right away; they stay blank
/// until `apply_atlas_result` sees the load settle.
pub fn slice_atlas(
    store: &mut AtlasTextureStore,
    source: Arc<dyn AssetSource>,
    url: &str,
    tile_count: u32,
) -> AtlasSlices {
    let ids = register_placeholders(store, tile_count);
    let load = spawn_load(source, url, move |path, bytes| {
        decode_atlas(path, &bytes, tile_count)
    });

    log::info!(
        "[texture_atlas_operations::slice_atlas] Slicing {} into {} tiles",
        url,
        tile_count
    );

    AtlasSlices { ids, load }
}

/// Copy a decoded tile into its texture
pub fn populate_tile(texture: &mut AtlasTextureData, pixels: RgbaImage) {
    texture.size = pixels.height();
    texture.color_space = ColorSpace::Srgb;
    texture.pixels = Some(pixels);
    texture.dirty = true;
}

/// Poll the strip load and, once it settles, fill the placeholders.
///
/// Failures are logged and leave every tile blank for the session.
pub fn apply_atlas_result(store: &mut AtlasTextureStore, slices: &mut AtlasSlices) -> LoadStatus {
    match poll_load(&mut slices.load) {
        AssetState::Pending => LoadStatus::Pending,
        AssetState::Ready(tiles) => {
            for (&id, pixels) in slices.ids.iter().zip(tiles) {
                match get_texture_mut(store, id) {
                    Ok(texture) => populate_tile(texture, pixels),
                    Err(e) => log::error!("[texture_atlas_operations::apply] {}", e),
                }
            }
            LoadStatus::Ready
        }
        AssetState::Failed(e) => {
            log::error!(
                "[texture_atlas_operations::apply] Atlas {} failed, tiles stay blank: {}",
                slices.load.label,
                e
            );
            LoadStatus::Failed
        }
    }
}

pub fn get_texture(store: &AtlasTextureStore, id: TextureId) -> ViewerResult<&AtlasTextureData> {
    store
        .textures
        .get(id)
        .ok_or_viewer(|| ViewerError::TextureNotFound { id })
}

pub fn get_texture_mut(
    store: &mut AtlasTextureStore,
    id: TextureId,
) -> ViewerResult<&mut AtlasTextureData> {
    store
        .textures
        .get_mut(id)
        .ok_or_viewer(|| ViewerError::TextureNotFound { id })
}

/// Ids whose pixels need uploading
pub fn dirty_textures(store: &AtlasTextureStore) -> Vec<TextureId> {
    store
        .textures
        .iter()
        .enumerate()
        .filter(|(_, t)| t.dirty)
        .map(|(id, _)| id)
        .collect()
}

/// Clear the dirty flag after the GPU copy was refreshed
pub fn mark_uploaded(texture: &mut AtlasTextureData) {
    texture.dirty = false;
}

/// Number of textures holding real pixels
pub fn populated_count(store: &AtlasTextureStore) -> usize {
    store.textures.iter().filter(|t| t.pixels.is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{insert_memory_asset, MemorySource};
    use image::Rgba;
    use std::time::Duration;

    /// Every pixel encodes its own coordinates
    fn coordinate_strip(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (x / 256) as u8, y as u8, 255])
        })
    }

    fn source_x(pixel: &Rgba<u8>) -> u32 {
        pixel[0] as u32 + 256 * pixel[1] as u32
    }

    #[test]
    fn test_600x100_strip_gives_six_tiles() {
        let strip = coordinate_strip(600, 100);
        let tiles = slice_tiles(&strip, 6).unwrap();

        assert_eq!(tiles.len(), 6);
        for tile in &tiles {
            assert_eq!(tile.dimensions(), (100, 100));
        }

        // tile 2 covers x in [200, 300)
        let tile = &tiles[2];
        for y in 0..100 {
            for x in 0..100 {
                let p = tile.get_pixel(x, y);
                assert_eq!(source_x(p), 200 + x);
                assert_eq!(p[2] as u32, y);
            }
        }
    }

    #[test]
    fn test_tiles_are_pixel_exact_for_several_counts() {
        for tile_count in 1..=7u32 {
            let side = 9;
            let strip = coordinate_strip(tile_count * side, side);
            let tiles = slice_tiles(&strip, tile_count).unwrap();

            assert_eq!(tiles.len() as u32, tile_count);
            for (i, tile) in tiles.iter().enumerate() {
                assert_eq!(tile.dimensions(), (side, side));
                for (x, y, p) in tile.enumerate_pixels() {
                    assert_eq!(p, strip.get_pixel(i as u32 * side + x, y));
                }
            }
        }
    }

    #[test]
    fn test_tile_order_is_left_to_right() {
        let strip = coordinate_strip(40, 10);
        let tiles = slice_tiles(&strip, 4).unwrap();
        let first_columns: Vec<u32> = tiles.iter().map(|t| source_x(t.get_pixel(0, 0))).collect();
        assert_eq!(first_columns, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_narrow_strip_rejected() {
        let strip = coordinate_strip(500, 100);
        match slice_tiles(&strip, 6) {
            Err(ViewerError::MalformedAtlas {
                width,
                height,
                tile_count,
                ..
            }) => assert_eq!((width, height, tile_count), (500, 100, 6)),
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_zero_tiles_rejected() {
        let strip = coordinate_strip(10, 10);
        assert!(slice_tiles(&strip, 0).is_err());
    }

    #[test]
    fn test_wide_strip_ignores_extra_columns() {
        let strip = coordinate_strip(35, 10);
        let tiles = slice_tiles(&strip, 3).unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(source_x(tiles[2].get_pixel(9, 0)), 29);
    }

    #[test]
    fn test_placeholders_start_blank() {
        let mut store = AtlasTextureStore::default();
        let ids = register_placeholders(&mut store, 6);

        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        for (i, &id) in ids.iter().enumerate() {
            let texture = get_texture(&store, id).unwrap();
            assert_eq!(texture.tile_index, i as u32);
            assert_eq!(texture.size, 0);
            assert!(texture.pixels.is_none());
            assert!(!texture.dirty);
        }
        assert!(matches!(
            get_texture(&store, 6),
            Err(ViewerError::TextureNotFound { id: 6 })
        ));
    }

    #[test]
    fn test_slice_atlas_populates_placeholders() {
        let strip = coordinate_strip(60, 10);
        let mut encoded = std::io::Cursor::new(Vec::new());
        strip
            .write_to(&mut encoded, image::ImageOutputFormat::Png)
            .unwrap();

        let mut source = MemorySource::default();
        insert_memory_asset(&mut source, "atlas.png", encoded.into_inner());

        let mut store = AtlasTextureStore::default();
        let mut slices = slice_atlas(&mut store, Arc::new(source), "atlas.png", 6);
        assert_eq!(populated_count(&store), 0);

        assert_eq!(settle(&mut store, &mut slices), LoadStatus::Ready);
        assert_eq!(populated_count(&store), 6);
        assert_eq!(dirty_textures(&store), vec![0, 1, 2, 3, 4, 5]);
        let third = get_texture(&store, slices.ids[2]).unwrap();
        assert_eq!(third.size, 10);
        assert_eq!(third.color_space, ColorSpace::Srgb);
        assert_eq!(source_x(third.pixels.as_ref().unwrap().get_pixel(0, 0)), 20);

        mark_uploaded(get_texture_mut(&mut store, 0).unwrap());
        assert_eq!(dirty_textures(&store), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_failed_fetch_leaves_tiles_blank() {
        let mut store = AtlasTextureStore::default();
        let mut slices = slice_atlas(
            &mut store,
            Arc::new(MemorySource::default()),
            "missing.jpg",
            6,
        );

        let status = settle(&mut store, &mut slices);
        assert_eq!(status, LoadStatus::Failed);
        assert_eq!(store.textures.len(), 6);
        assert_eq!(populated_count(&store), 0);
        assert!(dirty_textures(&store).is_empty());
    }

    /// Poll like the render loop does until the load settles
    fn settle(store: &mut AtlasTextureStore, slices: &mut AtlasSlices) -> LoadStatus {
        for _ in 0..2000 {
            let status = apply_atlas_result(store, slices);
            if status != LoadStatus::Pending {
                return status;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        LoadStatus::Pending
    }
}
