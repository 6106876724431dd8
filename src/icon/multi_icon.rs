use std::fs;
use std::path::Path;

use super::SingleIcon;
use crate::error::IconError;
use crate::rendering::{PngCodec, StandardPngCodec};

/// Name given to an icon loaded into an empty selection.
pub const UNTITLED: &str = "Untitled";

/// Ordered collection of icons with unique, case-insensitive names.
///
/// File operations act on the selected icon.
#[derive(Debug, Clone, Default)]
pub struct MultiIcon {
    icons: Vec<SingleIcon>,
    selected: Option<usize>,
}

impl MultiIcon {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SingleIcon> {
        self.icons.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SingleIcon> {
        self.icons.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SingleIcon> {
        self.icons.iter()
    }

    /// Append an empty icon.
    pub fn add(&mut self, name: &str) -> Result<&mut SingleIcon, IconError> {
        if self.contains(name) {
            return Err(IconError::IconNameAlreadyExists(name.to_string()));
        }
        let index = self.icons.len();
        self.icons.push(SingleIcon::new(name));
        Ok(&mut self.icons[index])
    }

    /// Remove an icon by name. Removing the selected icon clears the
    /// selection.
    pub fn remove(&mut self, name: &str) -> Result<SingleIcon, IconError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| IconError::IconNameNotFound(name.to_string()))?;
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Ok(self.icons.remove(index))
    }

    pub fn clear(&mut self) {
        self.icons.clear();
        self.selected = None;
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.icons
            .iter()
            .position(|icon| icon.name().eq_ignore_ascii_case(name))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SingleIcon> {
        self.index_of(name).map(|i| &self.icons[i])
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut SingleIcon> {
        let index = self.index_of(name)?;
        self.icons.get_mut(index)
    }

    pub fn icon_names(&self) -> Vec<&str> {
        self.icons.iter().map(SingleIcon::name).collect()
    }

    #[inline]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_selected_index(&mut self, index: Option<usize>) -> Result<(), IconError> {
        match index {
            Some(i) if i >= self.icons.len() => Err(IconError::InvalidContainerSelection),
            _ => {
                self.selected = index;
                Ok(())
            }
        }
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected().map(SingleIcon::name)
    }

    pub fn set_selected_name(&mut self, name: &str) -> Result<(), IconError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| IconError::IconNameNotFound(name.to_string()))?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn selected(&self) -> Option<&SingleIcon> {
        self.selected.and_then(|i| self.icons.get(i))
    }

    pub fn selected_mut(&mut self) -> Option<&mut SingleIcon> {
        let index = self.selected?;
        self.icons.get_mut(index)
    }

    pub fn load(&mut self, path: &Path) -> Result<(), IconError> {
        self.load_with(path, &StandardPngCodec::default())
    }

    pub fn load_with(&mut self, path: &Path, codec: &dyn PngCodec) -> Result<(), IconError> {
        let bytes = fs::read(path)?;
        self.read(&bytes, codec)
    }

    /// Load `.ico` bytes into the selected icon, keeping its name.
    ///
    /// Without a selection the whole collection is replaced by a single
    /// icon named [`UNTITLED`]. Either way the first icon is selected
    /// afterwards.
    pub fn read(&mut self, bytes: &[u8], codec: &dyn PngCodec) -> Result<(), IconError> {
        let mut loaded = SingleIcon::new(UNTITLED);
        loaded.read(bytes, codec)?;

        match self.selected.filter(|&i| i < self.icons.len()) {
            Some(index) => {
                loaded.set_name(self.icons[index].name());
                self.icons[index] = loaded;
            }
            None => self.icons = vec![loaded],
        }
        self.selected = Some(0);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), IconError> {
        self.save_with(path, &StandardPngCodec::default())
    }

    /// Write the selected icon as an `.ico` file.
    pub fn save_with(&self, path: &Path, codec: &dyn PngCodec) -> Result<(), IconError> {
        self.selected()
            .ok_or(IconError::InvalidContainerSelection)?
            .save_with(path, codec)
    }
}

impl<'a> IntoIterator for &'a MultiIcon {
    type Item = &'a SingleIcon;
    type IntoIter = std::slice::Iter<'a, SingleIcon>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octree_quant::Bitmap;
    use pretty_assertions::assert_eq;

    fn icon_bytes(size: u32) -> Vec<u8> {
        let bitmap =
            Bitmap::from_rgba(size, size, &vec![255; (size * size * 4) as usize]).unwrap();
        let mut icon = SingleIcon::new("tmp");
        icon.add(&bitmap).unwrap();
        crate::ico::IcoCodec::to_bytes(icon.images(), &StandardPngCodec::default()).unwrap()
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let mut multi = MultiIcon::new();
        multi.add("Main").unwrap();
        let err = multi.add("MAIN").unwrap_err();
        assert!(matches!(err, IconError::IconNameAlreadyExists(ref n) if n == "MAIN"));
        assert!(multi.contains("main"));
        assert_eq!(multi.get_by_name("mAiN").unwrap().name(), "Main");
        assert_eq!(multi.icon_names(), vec!["Main"]);
    }

    #[test]
    fn test_remove_adjusts_selection() {
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        multi.add("b").unwrap();
        multi.add("c").unwrap();
        multi.set_selected_name("c").unwrap();

        multi.remove("a").unwrap();
        assert_eq!(multi.selected_index(), Some(1));
        assert_eq!(multi.selected_name(), Some("c"));

        multi.remove("C").unwrap();
        assert_eq!(multi.selected_index(), None);

        let err = multi.remove("zzz").unwrap_err();
        assert!(matches!(err, IconError::IconNameNotFound(_)));
    }

    #[test]
    fn test_selection_bounds() {
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        assert!(matches!(
            multi.set_selected_index(Some(1)),
            Err(IconError::InvalidContainerSelection)
        ));
        multi.set_selected_index(Some(0)).unwrap();
        assert_eq!(multi.selected_name(), Some("a"));
        multi.set_selected_index(None).unwrap();
        assert_eq!(multi.selected_name(), None);
    }

    #[test]
    fn test_save_requires_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        let err = multi.save(&dir.path().join("a.ico")).unwrap_err();
        assert!(matches!(err, IconError::InvalidContainerSelection));
    }

    #[test]
    fn test_read_without_selection_replaces_all() {
        let codec = StandardPngCodec::default();
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        multi.add("b").unwrap();

        multi.read(&icon_bytes(16), &codec).unwrap();
        assert_eq!(multi.icon_names(), vec![UNTITLED]);
        assert_eq!(multi.selected_index(), Some(0));
        assert_eq!(multi.selected().unwrap().len(), 1);
    }

    #[test]
    fn test_read_with_selection_keeps_name() {
        let codec = StandardPngCodec::default();
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        multi.add("b").unwrap();
        multi.set_selected_name("b").unwrap();

        multi.read(&icon_bytes(32), &codec).unwrap();
        assert_eq!(multi.icon_names(), vec!["a", "b"]);
        assert_eq!(multi.get_by_name("b").unwrap().get(0).unwrap().width(), 32);
        assert!(multi.get_by_name("a").unwrap().is_empty());
        assert_eq!(multi.selected_index(), Some(0));
    }

    #[test]
    fn test_failed_read_changes_nothing() {
        let mut multi = MultiIcon::new();
        multi.add("a").unwrap();
        assert!(multi
            .read(&[1, 2, 3, 4, 5, 6], &StandardPngCodec::default())
            .is_err());
        assert_eq!(multi.icon_names(), vec!["a"]);
        assert_eq!(multi.selected_index(), None);
    }

    #[test]
    fn test_save_and_load_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.ico");

        let mut source = MultiIcon::new();
        source.add("a").unwrap();
        source.set_selected_name("a").unwrap();
        let bitmap = Bitmap::from_rgba(16, 16, &[128; 16 * 16 * 4]).unwrap();
        source.selected_mut().unwrap().add(&bitmap).unwrap();
        source.save(&path).unwrap();

        let mut target = MultiIcon::new();
        target.load(&path).unwrap();
        assert_eq!(
            target.selected().unwrap().images(),
            source.selected().unwrap().images()
        );
    }
}
