use std::cell::Cell;
use std::rc::Rc;
use yew::prelude::*;

/// Flag that flips to false when the calling component unmounts.
///
/// Spawned tasks hold a clone and check it before touching component state
/// or issuing a follow-up request, so work started by a view ends with it.
#[hook]
pub fn use_mounted() -> Rc<Cell<bool>> {
    let alive = use_memo((), |_| Cell::new(true));
    {
        let alive = alive.clone();
        use_effect_with((), move |_| move || alive.set(false));
    }
    alive
}
