use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct PushMessage {
    pub device_token: String,
    pub title: String,
    pub body: String,
}
