#![no_main]

use libfuzzer_sys::fuzz_target;
use ironsbom_catalog::{ImageSource, Layer, LayerEntry, LayerMetadata, LocationResolver};

fuzz_target!(|data: &[u8]| {
    let Ok(layers) = serde_json::from_slice::<Vec<Vec<LayerEntry>>>(data) else {
        return;
    };
    let layers: Vec<Layer> = layers
        .into_iter()
        .take(8)
        .enumerate()
        .map(|(index, entries)| Layer {
            metadata: LayerMetadata {
                index,
                digest: format!("sha256:{index}"),
                media_type: String::new(),
                size: 0,
            },
            entries,
        })
        .collect();

    let source = ImageSource::from_layers("fuzz:latest", &layers);
    let resolver = LocationResolver::default();
    for layer in &layers {
        for entry in &layer.entries {
            let _ = resolver.resolve_path(&entry.path, &source);
        }
    }
});
