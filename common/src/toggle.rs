//! 回答トグル規則
//!
//! 全画面で共有する唯一の実装。
//! - 同じボタンをもう一度押す → 未回答に戻す
//! - 違うボタンを押す → そのボタンの回答に置き換える

use crate::types::{Answer, YesNo};

pub fn toggle(current: Answer, clicked: YesNo) -> Answer {
    let selected = Answer::from(clicked);
    if current == selected {
        Answer::Unanswered
    } else {
        selected
    }
}
