// ==========================================
// KLine 提单导入 - 提单分组器
// ==========================================
// 状态机: 无活动提单 → (BLHEADER) → 活动提单 → (BLHEADER) → 关闭并新开
// 约束: 第一个 BLHEADER 之前的内容丢弃,不产生分组
// 约束: 输出顺序 = 文件中首次出现顺序 = 处理顺序
// ==========================================

use crate::domain::manifest::RecordGroup;
use crate::domain::types::RecordTag;
use crate::importer::tokenizer::TaggedLine;
use tracing::debug;

#[derive(Debug, Default)]
enum GrouperState {
    #[default]
    Idle,
    Active(RecordGroup),
}

/// 提单分组器
#[derive(Debug, Default)]
pub struct BillGrouper {
    state: GrouperState,
    groups: Vec<RecordGroup>,
    dropped_lines: usize,
}

impl BillGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推入一条已切分记录
    pub fn push(&mut self, line: TaggedLine) {
        if line.tag == RecordTag::BillStart {
            let previous = std::mem::replace(
                &mut self.state,
                GrouperState::Active(RecordGroup::new(line.content.clone())),
            );
            self.emit(previous);
        }

        match &mut self.state {
            GrouperState::Active(group) => group.push(line.tag, line.content),
            GrouperState::Idle => self.dropped_lines += 1,
        }
    }

    /// 结束输入,返回全部分组
    pub fn finish(mut self) -> Vec<RecordGroup> {
        let last = std::mem::take(&mut self.state);
        self.emit(last);

        if self.dropped_lines > 0 {
            debug!(dropped = self.dropped_lines, "首个提单之前的记录已丢弃");
        }
        self.groups
    }

    fn emit(&mut self, state: GrouperState) {
        if let GrouperState::Active(group) = state {
            if !group.is_empty() {
                debug!(
                    bill_number = group.bill_number(),
                    lines = group.line_count(),
                    "提单分组关闭"
                );
                self.groups.push(group);
            }
        }
    }
}

/// 将切分后的记录按提单分组
pub fn group_bills<I>(lines: I) -> Vec<RecordGroup>
where
    I: IntoIterator<Item = TaggedLine>,
{
    let mut grouper = BillGrouper::new();
    for line in lines {
        grouper.push(line);
    }
    grouper.finish()
}
