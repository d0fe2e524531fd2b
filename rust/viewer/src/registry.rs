// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object registry - id and type indexes, selection, reset snapshots
//!
//! The [`ObjectRegistry`] owns the handles of every loaded object and the
//! metadata needed to drive them:
//!
//! - **by id**: object id → handle and type tag
//! - **by type**: type tag → ids of the objects registered under it; every
//!   id lives in exactly one bucket
//! - **selection**: set of selected ids plus a sorted list view that is
//!   rebuilt on the first read after a change
//! - **reset snapshots**: color and visibility captured at registration
//!
//! ## Error policy
//!
//! Unresolved ids are collected in a [`BatchReport`] and logged. The batch
//! carries on past them, except in [`ObjectRegistry::set_color`], which stops
//! at the first miss. Callers may depend on either behavior.
//!
//! ## Threading
//!
//! Batch calls are not atomic across their ids. A multi-threaded host has to
//! put the whole registry behind one lock.

use std::cell::OnceCell;
use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::aabb::{compute_union_aabb, Aabb};
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::handle::{apply_color, ObjectDescriptor, SceneHandle};
use crate::materials::{Color, MaterialTable, Rgba};
use crate::params::{
    required, BatchReport, ColorParams, ResetParams, SelectionParams, VisibilityParams,
};

/// A handle plus the type it was registered under
#[derive(Debug)]
struct RegisteredObject<H> {
    handle: H,
    type_tag: String,
}

/// Registry of scene objects.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ObjectRegistry::with_materials(MaterialTable::builtin());
/// registry.add_object("1001", "IfcWall", engine.create_wall());
///
/// registry.set_selection_state(&SelectionParams::new(["1001"], true))?;
/// assert_eq!(registry.selected(), ["1001"]);
/// ```
#[derive(Debug)]
pub struct ObjectRegistry<H> {
    objects_by_id: FxHashMap<String, RegisteredObject<H>>,
    objects_by_type: FxHashMap<String, FxHashSet<String>>,

    selected: FxHashSet<String>,
    /// Sorted copy of `selected`; empty cell means stale
    selected_list: OnceCell<Vec<String>>,

    color_reset: FxHashMap<String, Rgba>,
    visibility_reset: FxHashMap<String, bool>,

    /// Default color per type, applied on registration when set
    materials: Option<MaterialTable>,
}

impl<H> Default for ObjectRegistry<H> {
    fn default() -> Self {
        Self {
            objects_by_id: FxHashMap::default(),
            objects_by_type: FxHashMap::default(),
            selected: FxHashSet::default(),
            selected_list: OnceCell::new(),
            color_reset: FxHashMap::default(),
            visibility_reset: FxHashMap::default(),
            materials: None,
        }
    }
}

impl<H: SceneHandle> ObjectRegistry<H> {
    /// Empty registry without a default material policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry that colors new objects from `materials`
    pub fn with_materials(materials: MaterialTable) -> Self {
        Self {
            materials: Some(materials),
            ..Self::default()
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        if config.apply_default_materials {
            Self::with_materials(config.materials.clone())
        } else {
            Self::new()
        }
    }

    /// Material table applied on registration, if any
    pub fn materials(&self) -> Option<&MaterialTable> {
        self.materials.as_ref()
    }

    // ---------------------------------------------------------------- registration

    /// Build a handle with `factory` and register it.
    ///
    /// A duplicate id replaces the earlier entry, and the displaced handle
    /// is destroyed.
    pub fn create_object<F>(&mut self, descriptor: &ObjectDescriptor, factory: F) -> &mut H
    where
        F: FnOnce(&ObjectDescriptor) -> H,
    {
        let handle = factory(descriptor);
        let (displaced, handle) = self.register(
            descriptor.object_id.clone(),
            descriptor.type_tag.clone(),
            handle,
        );
        if let Some(mut previous) = displaced {
            tracing::warn!(
                object_id = %descriptor.object_id,
                "Object id registered twice, destroying previous handle"
            );
            previous.destroy();
        }
        handle
    }

    /// Register an existing handle.
    ///
    /// The default material for `type_tag` is applied first (when a table is
    /// configured), then the handle's color and visibility are captured as
    /// reset snapshots. Returns the handle previously registered under `id`,
    /// still alive; destroying it is up to the caller.
    pub fn add_object(
        &mut self,
        id: impl Into<String>,
        type_tag: impl Into<String>,
        handle: H,
    ) -> Option<H> {
        self.register(id.into(), type_tag.into(), handle).0
    }

    fn register(&mut self, id: String, type_tag: String, mut handle: H) -> (Option<H>, &mut H) {
        if let Some(materials) = &self.materials {
            apply_color(&mut handle, &Color::from_rgba(materials.color_for(&type_tag)));
        }

        self.color_reset.insert(id.clone(), handle.color());
        self.visibility_reset.insert(id.clone(), handle.is_visible());

        if self.selected.contains(&id) {
            handle.set_highlighted(true);
        }

        self.objects_by_type
            .entry(type_tag.clone())
            .or_default()
            .insert(id.clone());

        let object = RegisteredObject { handle, type_tag };
        match self.objects_by_id.entry(id) {
            Entry::Occupied(entry) => {
                let (id, slot) = (entry.key().clone(), entry.into_mut());
                let previous = std::mem::replace(slot, object);
                if previous.type_tag != slot.type_tag {
                    remove_from_bucket(&mut self.objects_by_type, &previous.type_tag, &id);
                }
                (Some(previous.handle), &mut slot.handle)
            }
            Entry::Vacant(entry) => (None, &mut entry.insert(object).handle),
        }
    }

    /// Destroy every handle and drop all indexes, the selection and the
    /// snapshots. Calling it on an empty registry does nothing.
    pub fn clear(&mut self) {
        if self.objects_by_id.is_empty() && self.selected.is_empty() {
            return;
        }

        let count = self.objects_by_id.len();
        for object in self.objects_by_id.values_mut() {
            object.handle.destroy();
        }

        self.objects_by_id.clear();
        self.objects_by_type.clear();
        self.selected.clear();
        self.selected_list.take();
        self.color_reset.clear();
        self.visibility_reset.clear();

        tracing::debug!(count, "Cleared object registry");
    }

    // ---------------------------------------------------------------- lookups

    pub fn len(&self) -> usize {
        self.objects_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects_by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects_by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&H> {
        self.objects_by_id
            .get(id)
            .map(|o| &o.handle)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut H> {
        self.objects_by_id
            .get_mut(id)
            .map(|o| &mut o.handle)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Type tag an object was registered under
    pub fn type_of(&self, id: &str) -> Option<&str> {
        self.objects_by_id.get(id).map(|o| o.type_tag.as_str())
    }

    /// Ids registered under `type_tag`, sorted
    pub fn ids_of_type(&self, type_tag: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .objects_by_type
            .get(type_tag)
            .map(|bucket| bucket.iter().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Type tags with at least one registered object
    pub fn type_tags(&self) -> impl Iterator<Item = &str> {
        self.objects_by_type.keys().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.objects_by_id.keys().map(String::as_str)
    }

    pub fn color_reset(&self, id: &str) -> Option<Rgba> {
        self.color_reset.get(id).copied()
    }

    pub fn visibility_reset(&self, id: &str) -> Option<bool> {
        self.visibility_reset.get(id).copied()
    }

    /// Union of the world bounds of `ids`; see [`compute_union_aabb`]
    pub fn aabb_of<S: AsRef<str>>(&self, ids: &[S]) -> Option<Aabb> {
        compute_union_aabb(ids, |id| {
            self.objects_by_id
                .get(id)
                .and_then(|o| o.handle.world_aabb())
        })
    }

    // ---------------------------------------------------------------- batch operations

    /// Show or hide objects. Each id may name a type bucket (checked first)
    /// or a single object. Unresolved ids are reported and skipped.
    pub fn set_visibility(&mut self, params: &VisibilityParams) -> Result<BatchReport> {
        let ids = required(&params.ids, "ids")?;
        let visible = params.visible.unwrap_or(true);
        let mut report = BatchReport::default();

        for id in ids {
            if let Some(bucket) = self.objects_by_type.get(id) {
                for object_id in bucket {
                    if let Some(object) = self.objects_by_id.get_mut(object_id) {
                        object.handle.set_visible(visible);
                        report.applied += 1;
                    }
                }
            } else if let Some(object) = self.objects_by_id.get_mut(id) {
                object.handle.set_visible(visible);
                report.applied += 1;
            } else {
                tracing::warn!(id = %id, "Type or object not found");
                report.miss(id);
            }
        }

        Ok(report)
    }

    /// Recolor objects. Stops at the first unresolved id, leaving the rest
    /// of the batch untouched.
    pub fn set_color(&mut self, params: &ColorParams) -> Result<BatchReport> {
        let ids = required(&params.ids, "ids")?;
        let color = Color::from_components(required(&params.color, "color")?)?;
        let mut report = BatchReport::default();

        for (i, id) in ids.iter().enumerate() {
            let Some(object) = self.objects_by_id.get_mut(id) else {
                tracing::warn!(id = %id, "Object not found, aborting color batch");
                report.miss(id);
                report.aborted = i + 1 < ids.len();
                break;
            };
            apply_color(&mut object.handle, &color);
            report.applied += 1;
        }

        Ok(report)
    }

    /// Add objects to or remove them from the selection. Unresolved ids are
    /// reported and skipped.
    pub fn set_selection_state(&mut self, params: &SelectionParams) -> Result<BatchReport> {
        let ids = required(&params.ids, "ids")?;
        let selected = params.selected.unwrap_or(true);
        let mut report = BatchReport::default();

        for id in ids {
            let Some(object) = self.objects_by_id.get_mut(id) else {
                tracing::warn!(id = %id, "Object not found");
                report.miss(id);
                continue;
            };

            if selected {
                self.selected.insert(id.clone());
            } else {
                self.selected.remove(id);
            }
            object.handle.set_highlighted(selected);
            self.selected_list.take();
            report.applied += 1;
        }

        Ok(report)
    }

    /// Selected ids in sorted order.
    ///
    /// The list is cached; repeated reads return the same slice until the
    /// selection changes.
    pub fn selected(&self) -> &[String] {
        self.selected_list.get_or_init(|| {
            let mut ids: Vec<String> = self.selected.iter().cloned().collect();
            ids.sort_unstable();
            tracing::debug!(count = ids.len(), "Rebuilt selection list");
            ids
        })
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Whether the selection list is currently cached
    pub fn is_selection_cached(&self) -> bool {
        self.selected_list.get().is_some()
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        for id in self.selected.drain() {
            if let Some(object) = self.objects_by_id.get_mut(&id) {
                object.handle.set_highlighted(false);
            }
        }
        self.selected_list.take();
    }

    /// Restore state captured at registration.
    ///
    /// Visibility and color restore apply to `params.ids` (all objects when
    /// absent); unresolved ids are reported and skipped. The selection reset
    /// is always global. `camera_position` is not registry state and is
    /// ignored here.
    pub fn reset(&mut self, params: &ResetParams) -> BatchReport {
        let mut report = BatchReport::default();

        if params.visibility || params.element_colors {
            let restore = |id: &str, object: &mut RegisteredObject<H>| {
                if params.visibility {
                    if let Some(&visible) = self.visibility_reset.get(id) {
                        object.handle.set_visible(visible);
                    }
                }
                if params.element_colors {
                    if let Some(&rgba) = self.color_reset.get(id) {
                        apply_color(&mut object.handle, &Color::from_rgba(rgba));
                    }
                }
            };

            match &params.ids {
                Some(ids) => {
                    for id in ids {
                        match self.objects_by_id.get_mut(id) {
                            Some(object) => {
                                restore(id.as_str(), object);
                                report.applied += 1;
                            }
                            None => {
                                tracing::warn!(id = %id, "Object not found");
                                report.miss(id);
                            }
                        }
                    }
                }
                None => {
                    for (id, object) in self.objects_by_id.iter_mut() {
                        restore(id.as_str(), object);
                        report.applied += 1;
                    }
                }
            }
        }

        if params.selection_state {
            self.clear_selection();
        }

        report
    }
}

fn remove_from_bucket(
    buckets: &mut FxHashMap<String, FxHashSet<String>>,
    type_tag: &str,
    id: &str,
) {
    if let Some(bucket) = buckets.get_mut(type_tag) {
        bucket.remove(id);
        if bucket.is_empty() {
            buckets.remove(type_tag);
        }
    }
}
