use std::{
    any::{type_name, TypeId}, 
    sync::Arc
};
use bevy::{
    prelude::*,
    utils::HashMap
};
use super::pawn::{Pawn, PawnBundle};

pub type InstantiateFn = dyn Fn(&mut World) -> Entity + Send + Sync;

/// Descriptor a new pawn entity can be instantiated from.
#[derive(Clone)]
pub struct PawnTemplate(Arc<InstantiateFn>);

impl PawnTemplate {
    #[inline]
    pub fn new<F>(instantiate: F) -> Self
    where F: Fn(&mut World) -> Entity + Send + Sync + 'static {
        Self(Arc::new(instantiate))
    }

    /// Spawns a clone of `bundle` each time.
    #[inline]
    pub fn from_bundle<B>(bundle: B) -> Self
    where B: Bundle + Clone {
        Self::new(move |world| world.spawn(bundle.clone()).id())
    }

    /// Spawns `PawnBundle::new(P::default())` named `name`.
    #[inline]
    pub fn from_default<P>(name: &'static str) -> Self
    where P: Pawn + Default {
        Self::new(move |world| {
            world.spawn((
                PawnBundle::new(P::default()),
                Name::new(name)
            ))
            .id()
        })
    }

    #[inline]
    pub fn instantiate(&self, world: &mut World) -> Entity {
        (self.0)(world)
    }
}

/// Startup table of pawn templates by path, and of paths by pawn type.
#[derive(Resource, Default)]
pub struct PawnTemplates {
    templates: HashMap<String, PawnTemplate>,
    paths: HashMap<TypeId, String>
}

impl PawnTemplates {
    #[inline]
    pub fn insert(&mut self, path: impl Into<String>, template: PawnTemplate) {
        self.templates.insert(path.into(), template);
    }

    #[inline]
    pub fn register<P: Pawn>(&mut self, path: impl Into<String>, template: PawnTemplate) {
        let path = path.into();
        self.paths.insert(TypeId::of::<P>(), path.clone());
        self.insert(path, template);
    }

    #[inline]
    pub fn get(&self, path: &str) -> Option<&PawnTemplate> {
        self.templates.get(path)
    }

    #[inline]
    pub fn path_of_id(&self, type_id: &TypeId) -> Option<&str> {
        self.paths.get(type_id)
        .map(String::as_str)
        .filter(|p| !p.is_empty())
    }

    #[inline]
    pub fn path_of<P: Pawn>(&self) -> Option<&str> {
        self.path_of_id(&TypeId::of::<P>())
    }

    #[inline]
    pub fn template_of_id(&self, type_id: &TypeId) -> Option<&PawnTemplate> {
        self.path_of_id(type_id)
        .and_then(|p| self.get(p))
    }

    #[inline]
    pub fn template_of<P: Pawn>(&self) -> Option<&PawnTemplate> {
        self.template_of_id(&TypeId::of::<P>())
    }
}

pub trait PawnAppExt {
    fn register_pawn_template<P: Pawn>(
        &mut self, 
        path: impl Into<String>, 
        template: PawnTemplate
    ) -> &mut Self;
}

impl PawnAppExt for App {
    fn register_pawn_template<P: Pawn>(
        &mut self, 
        path: impl Into<String>, 
        template: PawnTemplate
    ) -> &mut Self {
        let path = path.into();
        debug!("pawn template {path} registered for {}", type_name::<P>());
        self.world_mut()
        .get_resource_or_insert_with(PawnTemplates::default)
        .register::<P>(path, template);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component, Default, Clone)]
    struct Walker;
    impl Pawn for Walker {}

    #[derive(Component, Default)]
    struct Flyer;
    impl Pawn for Flyer {}

    #[test]
    fn lookup_by_type() {
        let mut templates = PawnTemplates::default();
        templates.register::<Walker>("pawns/walker", PawnTemplate::from_default::<Walker>("Walker"));
        assert_eq!(templates.path_of::<Walker>(), Some("pawns/walker"));
        assert!(templates.template_of::<Walker>().is_some());
        assert!(templates.path_of::<Flyer>().is_none());
        assert!(templates.template_of::<Flyer>().is_none());
    }

    #[test]
    fn empty_path_is_unregistered() {
        let mut templates = PawnTemplates::default();
        templates.register::<Flyer>("", PawnTemplate::from_default::<Flyer>("Flyer"));
        assert!(templates.path_of::<Flyer>().is_none());
        assert!(templates.template_of::<Flyer>().is_none());
    }

    #[test]
    fn instantiate_spawns_new_entities() {
        let mut world = World::new();
        let template = PawnTemplate::from_bundle(PawnBundle::new(Walker));
        let a = template.instantiate(&mut world);
        let b = template.instantiate(&mut world);
        assert_ne!(a, b);
        assert!(world.get::<Walker>(a).is_some());
        assert!(world.get::<Walker>(b).is_some());
    }

    #[test]
    fn app_registration() {
        let mut app = App::new();
        app.register_pawn_template::<Walker>(
            "pawns/walker", 
            PawnTemplate::from_default::<Walker>("Walker")
        );
        let templates = app.world().resource::<PawnTemplates>();
        assert_eq!(templates.path_of::<Walker>(), Some("pawns/walker"));
    }
}
