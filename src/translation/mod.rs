/*!
 * Translation of recognized speech into the target language.
 *
 * - `core`: the `Translator` boundary and the provider-backed `TranslationService`
 * - `router`: chooses between passthrough, engine translation to English and
 *   per-segment translation, and runs the chosen mode
 */

pub use self::core::{TranslationService, Translator};
pub use self::router::{RouteOptions, RoutingMode, TranslationRequest, route};

pub mod core;
pub mod router;
